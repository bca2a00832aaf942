use std::net::Ipv4Addr;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BucketNameError {
    #[error("no bucket specified")]
    Empty,
    #[error("bucket name must be at least {MIN_NAME_LEN} and no more than {MAX_NAME_LEN} characters long")]
    Length,
    #[error("bucket label cannot be empty")]
    EmptyLabel,
    #[error("bucket label must start with a lowercase letter or number")]
    LabelStart,
    #[error("bucket label cannot start or end with a hyphen")]
    LabelHyphen,
    #[error("bucket name must contain only lowercase letters, numbers or hyphens")]
    InvalidCharacter,
    #[error("bucket name cannot be formatted as an IP address")]
    IpAddress,
}

/// Validate a bucket name: 3-63 characters of lowercase letters, digits,
/// hyphens and periods, split by periods into non-empty labels that start
/// with a letter or digit and do not end with a hyphen. Dotted-quad IPv4
/// addresses are rejected.
pub fn validate_bucket_name(name: &str) -> Result<(), BucketNameError> {
    if name.is_empty() {
        return Err(BucketNameError::Empty);
    }
    if name.len() < MIN_NAME_LEN || name.len() > MAX_NAME_LEN {
        return Err(BucketNameError::Length);
    }

    for label in name.split('.') {
        validate_label(label.as_bytes())?;
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(BucketNameError::IpAddress);
    }

    Ok(())
}

fn validate_label(label: &[u8]) -> Result<(), BucketNameError> {
    let (first, last) = match (label.first(), label.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(BucketNameError::EmptyLabel),
    };

    if first == b'-' || last == b'-' {
        return Err(BucketNameError::LabelHyphen);
    }
    if !is_lower_alnum(first) {
        return Err(BucketNameError::LabelStart);
    }
    if label
        .iter()
        .any(|&c| !is_lower_alnum(c) && c != b'-')
    {
        return Err(BucketNameError::InvalidCharacter);
    }

    Ok(())
}

fn is_lower_alnum(c: u8) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}
