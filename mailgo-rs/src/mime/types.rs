use bytes::Bytes;

/// A file attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name advertised in `Content-Type` and `Content-Disposition`
    pub filename: String,
    /// Raw file content
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new<T: Into<String>>(filename: T, content: Vec<u8>) -> Self {
        Attachment {
            filename: filename.into(),
            content,
        }
    }
}

/// Serialized message plus the recipients it is addressed to
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    /// Boundary delimiting the MIME parts
    pub boundary: String,
    /// Envelope recipients
    pub recipients: Vec<String>,
    /// Full message, CRLF line endings
    pub body: Bytes,
}

impl ComposedMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Message size in bytes
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
