use crate::error::{MailError, Result};

/// A complete (possibly multi-line) SMTP reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    /// Text of every line, code and separator stripped
    pub lines: Vec<String>,
}

impl SmtpReply {
    /// Parse one reply line into `(code, is_last, text)`
    pub fn parse_line(line: &str) -> Result<(u16, bool, &str)> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.len() < 3 || !line.is_char_boundary(3) {
            return Err(MailError::SmtpProtocol(format!("Malformed reply: {:?}", line)));
        }

        let code: u16 = line[..3]
            .parse()
            .map_err(|_| MailError::SmtpProtocol(format!("Malformed reply code: {:?}", line)))?;

        match line.as_bytes().get(3) {
            None => Ok((code, true, "")),
            Some(b' ') => Ok((code, true, &line[4..])),
            Some(b'-') => Ok((code, false, &line[4..])),
            Some(_) => Err(MailError::SmtpProtocol(format!("Malformed reply: {:?}", line))),
        }
    }

    /// Positive completion (2xx)
    pub fn is_positive(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn message(&self) -> String {
        self.lines.join(" ")
    }

    /// Fail unless the reply code equals `expected`
    pub fn expect_code(self, expected: u16) -> Result<Self> {
        if self.code == expected {
            Ok(self)
        } else {
            Err(MailError::Reply {
                code: self.code,
                message: self.message(),
            })
        }
    }

    /// Extension keywords from an EHLO reply, uppercased
    ///
    /// The first line is the server greeting and is skipped.
    pub fn extensions(&self) -> Vec<String> {
        self.lines
            .iter()
            .skip(1)
            .map(|l| l.trim().to_ascii_uppercase())
            .filter(|l| !l.is_empty())
            .collect()
    }
}
