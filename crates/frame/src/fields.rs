//! The single schema table every `&`-delimited payload grammar in §6 is
//! parsed and built through.
//!
//! The wire format keeps the original implementation's convention of
//! cramming textual, delimiter-separated subfields inside a nominally
//! binary frame. Rather than let every call site re-implement its own
//! ad-hoc split, every grammar in the protocol goes through [`split`] and
//! [`join`] here, with a named helper per payload shape so a caller never
//! hand-rolls the field count.

use crate::{FIELD_DELIMITER, FrameError};

/// Splits `payload` into exactly `count` `&`-delimited subfields, with the
/// final subfield absorbing any remaining delimiters (so a filename or
/// reason string may itself be arbitrary text once the fixed fields ahead
/// of it are consumed).
///
/// Returns [`FrameError::FieldArity`] if fewer than `count` delimiters are
/// present.
pub fn split(payload: &[u8], count: usize) -> Result<Vec<&[u8]>, FrameError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut parts = Vec::with_capacity(count);
    let mut rest = payload;
    for _ in 0..count - 1 {
        match rest.iter().position(|&b| b == FIELD_DELIMITER) {
            Some(idx) => {
                parts.push(&rest[..idx]);
                rest = &rest[idx + 1..];
            }
            None => {
                return Err(FrameError::FieldArity {
                    expected: count,
                    found: parts.len() + 1,
                });
            }
        }
    }
    parts.push(rest);
    Ok(parts)
}

/// Joins `parts` with the protocol's `&` delimiter into a payload byte
/// vector.
#[must_use]
pub fn join(parts: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(FIELD_DELIMITER);
        }
        out.extend_from_slice(part.as_bytes());
    }
    out
}

fn as_str(field: &[u8]) -> Result<&str, FrameError> {
    std::str::from_utf8(field).map_err(|_| FrameError::InvalidUtf8)
}

/// `CONNECT_REQ` request payload: `username&ip&port`.
pub fn parse_connect_req(payload: &[u8]) -> Result<(&str, &str, &str), FrameError> {
    let parts = split(payload, 3)?;
    Ok((as_str(parts[0])?, as_str(parts[1])?, as_str(parts[2])?))
}

/// Builds a `CONNECT_REQ` request payload.
#[must_use]
pub fn build_connect_req(username: &str, ip: &str, port: &str) -> Vec<u8> {
    join(&[username, ip, port])
}

/// `WORKER_REG` request payload: `class&ip&port`.
pub fn parse_worker_reg(payload: &[u8]) -> Result<(&str, &str, &str), FrameError> {
    let parts = split(payload, 3)?;
    Ok((as_str(parts[0])?, as_str(parts[1])?, as_str(parts[2])?))
}

/// Builds a `WORKER_REG` request payload.
#[must_use]
pub fn build_worker_reg(class: &str, ip: &str, port: &str) -> Vec<u8> {
    join(&[class, ip, port])
}

/// `DISTORT_REQ` / `RESUME_REQ` request payload: `class&filename`.
pub fn parse_distort_req(payload: &[u8]) -> Result<(&str, &str), FrameError> {
    let parts = split(payload, 2)?;
    Ok((as_str(parts[0])?, as_str(parts[1])?))
}

/// Builds a `DISTORT_REQ` / `RESUME_REQ` request payload.
#[must_use]
pub fn build_distort_req(class: &str, filename: &str) -> Vec<u8> {
    join(&[class, filename])
}

/// `DISTORT_REQ` / `RESUME_REQ` success reply payload: `ip&port`.
pub fn parse_worker_endpoint(payload: &[u8]) -> Result<(&str, &str), FrameError> {
    let parts = split(payload, 2)?;
    Ok((as_str(parts[0])?, as_str(parts[1])?))
}

/// Builds a `DISTORT_REQ` / `RESUME_REQ` success reply payload.
#[must_use]
pub fn build_worker_endpoint(ip: &str, port: &str) -> Vec<u8> {
    join(&[ip, port])
}

/// `WORKER_CONNECT` request payload:
/// `username&filename&filesize&md5&factor`.
pub fn parse_worker_connect(
    payload: &[u8],
) -> Result<(&str, &str, &str, &str, &str), FrameError> {
    let parts = split(payload, 5)?;
    Ok((
        as_str(parts[0])?,
        as_str(parts[1])?,
        as_str(parts[2])?,
        as_str(parts[3])?,
        as_str(parts[4])?,
    ))
}

/// Builds a `WORKER_CONNECT` request payload.
#[must_use]
pub fn build_worker_connect(
    username: &str,
    filename: &str,
    filesize: &str,
    md5: &str,
    factor: &str,
) -> Vec<u8> {
    join(&[username, filename, filesize, md5, factor])
}

/// `FILE_INFO` payload: `filesize&md5`.
pub fn parse_file_info(payload: &[u8]) -> Result<(&str, &str), FrameError> {
    let parts = split(payload, 2)?;
    Ok((as_str(parts[0])?, as_str(parts[1])?))
}

/// Builds a `FILE_INFO` payload.
#[must_use]
pub fn build_file_info(filesize: &str, md5: &str) -> Vec<u8> {
    join(&[filesize, md5])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_connect_round_trips() {
        let payload = build_worker_connect("alice", "photo.png", "1024", "abc123", "2.5");
        let (username, filename, filesize, md5, factor) = parse_worker_connect(&payload).unwrap();
        assert_eq!(username, "alice");
        assert_eq!(filename, "photo.png");
        assert_eq!(filesize, "1024");
        assert_eq!(md5, "abc123");
        assert_eq!(factor, "2.5");
    }

    #[test]
    fn filename_may_itself_contain_delimiter_in_final_field() {
        let payload = build_distort_req("Text", "a&b.txt");
        let (class, filename) = parse_distort_req(&payload).unwrap();
        assert_eq!(class, "Text");
        assert_eq!(filename, "a&b.txt");
    }

    #[test]
    fn missing_fields_report_arity_error() {
        let err = parse_connect_req(b"alice&127.0.0.1").unwrap_err();
        assert_eq!(
            err,
            FrameError::FieldArity {
                expected: 3,
                found: 2
            }
        );
    }
}
