//! Newline-delimited records of symbolic growth profiles.
//!
//! A record captures the output of [`growth_profile`](crate::growth_profile)
//! for one parameter set as five ASCII lines:
//!
//! ```text
//! set:M3
//! exponents:1 2 3
//! monomials:3 9 19
//! degrees:1 2 3
//! hash:<64 hex digits>
//! ```
//!
//! The hash is a BLAKE2b-256 transcript digest over the other four lines,
//! so a record that was edited after it was written fails verification.

use crate::{error::AlgebraError, symbolic::GrowthStats, transcript::Transcript};

const RECORD_DOMAIN: &[u8] = b"power_algebra:v1:growth-record";

/// A parsed growth record together with its stored digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthRecord {
    /// Name of the parameter set the profile was computed for.
    pub name: String,
    /// Exponents `k`, in the order they were written.
    pub exponents: Vec<u64>,
    /// Distinct monomials of `X^k`.
    pub monomials: Vec<u64>,
    /// Total degree of `X^k`.
    pub degrees: Vec<u64>,
    /// Digest stored on the `hash:` line.
    pub hash: [u8; 32],
}

impl GrowthRecord {
    /// Builds a record (with a fresh digest) from computed statistics.
    pub fn from_stats(name: &str, stats: &[GrowthStats]) -> Self {
        let exponents: Vec<u64> = stats.iter().map(|s| s.exponent).collect();
        let monomials: Vec<u64> = stats.iter().map(|s| s.monomials as u64).collect();
        let degrees: Vec<u64> = stats.iter().map(|s| s.degree as u64).collect();
        let hash = compute_digest(name, &exponents, &monomials, &degrees);
        Self {
            name: name.to_string(),
            exponents,
            monomials,
            degrees,
            hash,
        }
    }

    /// Recomputes the digest and compares it with the stored one.
    pub fn verify(&self) -> Result<(), AlgebraError> {
        if self.exponents.len() != self.monomials.len() || self.exponents.len() != self.degrees.len()
        {
            return Err(AlgebraError::Encoding(
                "record columns have different lengths".to_string(),
            ));
        }
        let computed = compute_digest(&self.name, &self.exponents, &self.monomials, &self.degrees);
        if computed == self.hash {
            Ok(())
        } else {
            Err(AlgebraError::Encoding("hash mismatch".to_string()))
        }
    }

    /// Renders the record as its five lines.
    pub fn to_lines(&self) -> Vec<String> {
        vec![
            format!("set:{}", self.name),
            format!("exponents:{}", encode_u64_slice(&self.exponents)),
            format!("monomials:{}", encode_u64_slice(&self.monomials)),
            format!("degrees:{}", encode_u64_slice(&self.degrees)),
            format!("hash:{}", hex::encode(self.hash)),
        ]
    }
}

fn encode_u64_slice(values: &[u64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Computes the digest stored on the `hash:` line of a growth record.
pub fn compute_digest(name: &str, exponents: &[u64], monomials: &[u64], degrees: &[u64]) -> [u8; 32] {
    let mut transcript = Transcript::new(RECORD_DOMAIN);
    transcript.append_label(name.as_bytes());
    for column in [exponents, monomials, degrees] {
        transcript.append(column.len() as u64);
        transcript.append_slice(column);
    }
    transcript.digest()
}

/// Writes the record for `stats` line by line through `write_line`.
pub fn write_record<W>(mut write_line: W, name: &str, stats: &[GrowthStats]) -> std::io::Result<()>
where
    W: FnMut(&str) -> std::io::Result<()>,
{
    for line in GrowthRecord::from_stats(name, stats).to_lines() {
        write_line(&line)?;
    }
    Ok(())
}

fn strip<'a>(line: Option<&'a str>, prefix: &str) -> Result<&'a str, AlgebraError> {
    let line = line.ok_or_else(|| AlgebraError::Encoding(format!("missing {prefix} line")))?;
    line.strip_prefix(prefix)
        .map(str::trim)
        .ok_or_else(|| AlgebraError::Encoding(format!("missing {prefix} prefix")))
}

fn parse_vec_u64(line: Option<&str>, prefix: &str) -> Result<Vec<u64>, AlgebraError> {
    strip(line, prefix)?
        .split_whitespace()
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| AlgebraError::Encoding(format!("invalid integer in {prefix}")))
        })
        .collect()
}

/// Parses a growth record without checking its digest.
pub fn parse_record<'a, I>(lines: I) -> Result<GrowthRecord, AlgebraError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut iter = lines.into_iter();
    let name = strip(iter.next(), "set:")?.to_string();
    let exponents = parse_vec_u64(iter.next(), "exponents:")?;
    let monomials = parse_vec_u64(iter.next(), "monomials:")?;
    let degrees = parse_vec_u64(iter.next(), "degrees:")?;
    let hash_hex = strip(iter.next(), "hash:")?;
    let bytes = hex::decode(hash_hex).map_err(|err| AlgebraError::Encoding(err.to_string()))?;
    let hash: [u8; 32] = bytes
        .try_into()
        .map_err(|_| AlgebraError::Encoding("hash must be 32 bytes".to_string()))?;
    Ok(GrowthRecord {
        name,
        exponents,
        monomials,
        degrees,
        hash,
    })
}

/// Parses a growth record and checks it against its stored digest.
pub fn verify_record_lines<'a, I>(lines: I) -> Result<GrowthRecord, AlgebraError>
where
    I: IntoIterator<Item = &'a str>,
{
    let record = parse_record(lines)?;
    record.verify()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Vec<GrowthStats> {
        [(1, 3, 1), (2, 9, 2), (3, 19, 3)]
            .iter()
            .map(|&(exponent, monomials, degree)| GrowthStats {
                exponent,
                monomials,
                per_component: Vec::new(),
                degree,
            })
            .collect()
    }

    #[test]
    fn test_write_record_format() {
        let mut lines = Vec::new();
        write_record(
            |line| {
                lines.push(line.to_string());
                Ok(())
            },
            "M3",
            &stats(),
        )
        .unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "set:M3");
        assert_eq!(lines[1], "exponents:1 2 3");
        assert_eq!(lines[2], "monomials:3 9 19");
        assert_eq!(lines[3], "degrees:1 2 3");
        assert!(lines[4].starts_with("hash:"));
        assert_eq!(lines[4].len(), "hash:".len() + 64);
    }

    #[test]
    fn test_parse_and_verify() {
        let lines = GrowthRecord::from_stats("M4", &stats()).to_lines();
        let record = verify_record_lines(lines.iter().map(|s| s.as_str())).unwrap();
        assert_eq!(record.name, "M4");
        assert_eq!(record.monomials, vec![3, 9, 19]);
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let mut lines = GrowthRecord::from_stats("M3", &stats()).to_lines();
        lines[2] = "monomials:3 9 20".to_string();
        assert!(parse_record(lines.iter().map(|s| s.as_str())).is_ok());
        assert!(verify_record_lines(lines.iter().map(|s| s.as_str())).is_err());

        let mut renamed = GrowthRecord::from_stats("M3", &stats()).to_lines();
        renamed[0] = "set:M4".to_string();
        assert!(verify_record_lines(renamed.iter().map(|s| s.as_str())).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(parse_record(["set:M3", "exponents:1"]).is_err());
        assert!(parse_record(["set:M3", "exponents:x", "monomials:", "degrees:", "hash:00"]).is_err());
        assert!(parse_record(["set:M3", "exponents:", "monomials:", "degrees:", "hash:00"]).is_err());
    }
}
