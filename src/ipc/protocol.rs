//! Wire protocol
//!
//! A request is a single line holding a JSON array of strings: the command
//! name followed by its arguments, e.g. `["LIST","photos","2021/"]`. The
//! reply is a status line (`OK` or `ERROR`) followed by the body: the
//! handler's reply text on success, the error message on failure.

/// Status line for a successful command.
pub const STATUS_OK: &str = "OK";

/// Status line for a failed command.
pub const STATUS_ERROR: &str = "ERROR";

/// Request payloads that cannot be decoded into a command and argument list.
///
/// A decode failure is reported to the client; no handler is invoked.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON in request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty request")]
    Empty,
}

/// Split a request line into a command name and its arguments.
///
/// The command name is returned as sent; case normalization is the
/// dispatcher's job.
pub fn parse_request(line: &str) -> Result<(String, Vec<String>), DecodeError> {
    let fields: Vec<String> = serde_json::from_str(line)?;
    let (command, args) = fields.split_first().ok_or(DecodeError::Empty)?;
    Ok((command.clone(), args.to_vec()))
}

/// Frame a reply: the status line, a newline, then the body verbatim.
pub fn encode_reply(status: &str, body: &str) -> String {
    format!("{}\n{}", status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_args() {
        let (command, args) = parse_request(r#"["LIST","photos","2021/"]"#).unwrap();
        assert_eq!(command, "LIST");
        assert_eq!(args, vec!["photos".to_string(), "2021/".to_string()]);
    }

    #[test]
    fn test_parse_command_without_args() {
        let (command, args) = parse_request(r#"["INVALIDATE"]"#).unwrap();
        assert_eq!(command, "INVALIDATE");
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_preserves_case() {
        let (command, _) = parse_request(r#"["list"]"#).unwrap();
        assert_eq!(command, "list");
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_request("LIST photos 2021/").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_request(r#"{"command":"LIST"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_parse_rejects_non_string_elements() {
        let err = parse_request(r#"["LIST", 42]"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_parse_rejects_empty_array() {
        let err = parse_request("[]").unwrap_err();
        assert!(matches!(err, DecodeError::Empty));
    }

    #[test]
    fn test_encode_ok_reply() {
        assert_eq!(
            encode_reply(STATUS_OK, "E1|logs/2021/a.txt\n"),
            "OK\nE1|logs/2021/a.txt\n"
        );
        assert_eq!(encode_reply(STATUS_OK, ""), "OK\n");
    }

    #[test]
    fn test_encode_error_reply() {
        assert_eq!(
            encode_reply(STATUS_ERROR, "bad command: GLOB"),
            "ERROR\nbad command: GLOB"
        );
    }
}
