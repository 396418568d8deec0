//! Command results, rendered either as text or as pretty JSON.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use cryptoplay_core::merkle::{MerkleProof, ProofStep};
use cryptoplay_core::paillier::PaillierKeyView;
use cryptoplay_core::shares::ThresholdSignature;
use cryptoplay_core::speed::Timing;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A result that knows its human-readable form.
pub trait Report: Serialize {
    fn text(&self) -> String;
}

pub fn emit<R: Report>(out: &mut impl Write, format: OutputFormat, report: &R) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", report.text().trim_end())?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(report)?)?,
    }
    Ok(())
}

//==================== hash ====================//

#[derive(Serialize)]
pub struct DigestLine {
    pub algorithm: &'static str,
    pub hex: String,
}

#[derive(Serialize)]
pub struct HashReport {
    pub input: String,
    pub digests: Vec<DigestLine>,
}

impl Report for HashReport {
    fn text(&self) -> String {
        let width = self.digests.iter().map(|d| d.algorithm.len()).max().unwrap_or(0);
        let mut s = String::new();
        for d in &self.digests {
            let _ = writeln!(s, "{:width$}  {}", d.algorithm, d.hex);
        }
        s
    }
}

//==================== merkle ====================//

#[derive(Serialize)]
pub struct TreeReport {
    pub layout: &'static str,
    pub leaves: Vec<String>,
    pub levels: Vec<Vec<String>>,
    pub root: String,
}

impl TreeReport {
    /// Only the root, for `merkle root`.
    pub fn root_only(&self) -> RootReport<'_> {
        RootReport {
            layout: self.layout,
            root: &self.root,
        }
    }
}

impl Report for TreeReport {
    fn text(&self) -> String {
        let mut s = String::new();
        let top = self.levels.len().saturating_sub(1);
        for (depth, level) in self.levels.iter().enumerate().rev() {
            let label = match depth {
                0 => "leaves".to_string(),
                d if d == top => "root".to_string(),
                d => format!("level {d}"),
            };
            let _ = writeln!(s, "{label}:");
            for (i, node) in level.iter().enumerate() {
                if depth == 0 {
                    let _ = writeln!(s, "  [{i}] {node}  {:?}", self.leaves[i]);
                } else {
                    let _ = writeln!(s, "  [{i}] {node}");
                }
            }
        }
        s
    }
}

#[derive(Serialize)]
pub struct RootReport<'a> {
    pub layout: &'static str,
    pub root: &'a str,
}

impl Report for RootReport<'_> {
    fn text(&self) -> String {
        self.root.to_string()
    }
}

#[derive(Serialize)]
pub struct ProofReport {
    pub layout: &'static str,
    pub leaf: String,
    pub root: String,
    pub proof: MerkleProof,
    pub valid: bool,
}

impl Report for ProofReport {
    fn text(&self) -> String {
        let mut s = format!(
            "leaf  [{}] {:?}\nroot  {}\n",
            self.proof.leaf_index, self.leaf, self.root
        );
        if self.proof.is_empty() {
            s.push_str("proof (empty, single leaf)\n");
        }
        for step in self.proof.steps() {
            let _ = writeln!(s, "--step {step}");
        }
        let _ = writeln!(s, "valid {}", self.valid);
        s
    }
}

/// Outcome of any yes/no check.
#[derive(Serialize)]
pub struct VerdictReport {
    pub subject: &'static str,
    pub valid: bool,
}

impl Report for VerdictReport {
    fn text(&self) -> String {
        let verdict = if self.valid { "valid" } else { "invalid" };
        format!("{}: {verdict}", self.subject)
    }
}

pub fn render_steps(steps: &[ProofStep]) -> Vec<String> {
    steps.iter().map(ProofStep::to_string).collect()
}

//==================== signatures ====================//

#[derive(Serialize)]
pub struct KeyReport {
    pub scheme: &'static str,
    pub secret_hex: String,
    pub public_hex: String,
}

impl Report for KeyReport {
    fn text(&self) -> String {
        format!(
            "scheme {}\nsecret {}\npublic {}",
            self.scheme, self.secret_hex, self.public_hex
        )
    }
}

#[derive(Serialize)]
pub struct SignatureReport {
    pub scheme: &'static str,
    pub message: String,
    pub signature_hex: String,
}

impl Report for SignatureReport {
    fn text(&self) -> String {
        self.signature_hex.clone()
    }
}

//==================== paillier ====================//

impl Report for PaillierKeyView {
    fn text(&self) -> String {
        format!(
            "bits   {}\nn      {}\nlambda {}\nmu     {}",
            self.bits, self.n, self.lambda, self.mu
        )
    }
}

/// A single big integer, printed in decimal.
#[derive(Serialize)]
pub struct NumberReport {
    pub label: &'static str,
    pub value: String,
}

impl Report for NumberReport {
    fn text(&self) -> String {
        self.value.clone()
    }
}

#[derive(Serialize)]
pub struct PaillierDemoReport {
    pub bits: u64,
    pub a: String,
    pub b: String,
    pub ciphertext_a: String,
    pub ciphertext_b: String,
    pub ciphertext_sum: String,
    pub decrypted_sum: String,
}

impl Report for PaillierDemoReport {
    fn text(&self) -> String {
        format!(
            "E({a})        = {}\nE({b})        = {}\nE({a}) * E({b}) = {}\ndecrypt      = {}",
            self.ciphertext_a,
            self.ciphertext_b,
            self.ciphertext_sum,
            self.decrypted_sum,
            a = self.a,
            b = self.b,
        )
    }
}

//==================== shares / commitment ====================//

#[derive(Serialize)]
pub struct SharesReport {
    pub parts: usize,
    pub shares: Vec<String>,
}

impl Report for SharesReport {
    fn text(&self) -> String {
        let mut s = String::new();
        for (i, share) in self.shares.iter().enumerate() {
            let _ = writeln!(s, "share {} {share}", i + 1);
        }
        s
    }
}

impl Report for ThresholdSignature {
    fn text(&self) -> String {
        format!(
            "scheme       {}\nparticipants {}\npublic       {}\nsignature    {}",
            self.scheme,
            self.participants,
            hex::encode(&self.public_key),
            hex::encode(&self.signature)
        )
    }
}

#[derive(Serialize)]
pub struct CommitmentReport {
    pub commitment: String,
}

impl Report for CommitmentReport {
    fn text(&self) -> String {
        self.commitment.clone()
    }
}

//==================== speed ====================//

#[derive(Serialize)]
pub struct SpeedReport {
    pub message: String,
    pub timings: Vec<Timing>,
}

impl Report for SpeedReport {
    fn text(&self) -> String {
        let mut s = format!(
            "{:<16} {:>10} {:>12} {:>12}  {}\n",
            "scheme", "iterations", "sign ms", "verify ms", "valid"
        );
        for t in &self.timings {
            let _ = writeln!(
                s,
                "{:<16} {:>10} {:>12.3} {:>12.3}  {}",
                t.scheme.name(),
                t.iterations,
                t.sign_ms,
                t.verify_ms,
                t.valid
            );
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<R: Report>(format: OutputFormat, report: &R) -> String {
        let mut out = Vec::new();
        emit(&mut out, format, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn verdict_text_and_json() {
        let report = VerdictReport {
            subject: "signature",
            valid: false,
        };
        assert_eq!(render(OutputFormat::Text, &report), "signature: invalid\n");

        let json: serde_json::Value =
            serde_json::from_str(&render(OutputFormat::Json, &report)).unwrap();
        assert_eq!(json["subject"], "signature");
        assert_eq!(json["valid"], false);
    }

    #[test]
    fn tree_text_lists_root_first() {
        let report = TreeReport {
            layout: "hex-sha256",
            leaves: vec!["x".into(), "y".into()],
            levels: vec![vec!["aa".into(), "bb".into()], vec!["cc".into()]],
            root: "cc".into(),
        };
        let text = render(OutputFormat::Text, &report);
        assert!(text.starts_with("root:\n  [0] cc\nleaves:\n"));
        assert!(text.contains("[1] bb  \"y\""));
        assert_eq!(render(OutputFormat::Text, &report.root_only()), "cc\n");
    }
}
