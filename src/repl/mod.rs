//! Line-oriented driver for the playground sessions.

use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use cryptoplay_core::hash::HashAlgorithm;
use cryptoplay_core::signature::SchemeKind;
use tracing::{debug, warn};

use crate::session::{MerkleSession, PaillierSession, SignerSessions};

const HELP: &str = "\
commands:
  hash <text>                       digest with every hash algorithm
  merkle                            show leaves, root and the selected proof
  merkle add <text>                 append a leaf
  merkle edit <index> <text>        replace a leaf
  merkle remove <index>             drop a leaf (needs more than two)
  merkle select <index>             choose the leaf to prove
  sign <scheme> keygen              new key pair (ecdsa, schnorr, eddsa, bls)
  sign <scheme> message <text>      change the message
  sign <scheme> sign | verify | show
  paillier keygen                   new key pair
  paillier set <a> <b>              plaintexts to add
  paillier encrypt | add | show
  help
  quit";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    merkle: MerkleSession,
    signers: SignerSessions,
    paillier: PaillierSession,
}

impl Repl {
    pub fn new(paillier_bits: usize) -> Result<Self> {
        Ok(Self {
            merkle: MerkleSession::new()?,
            signers: SignerSessions::default(),
            paillier: PaillierSession::new(paillier_bits),
        })
    }

    /// Read commands until EOF or `quit`. A failing command prints
    /// `error: ...` and the loop goes on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W, prompt: bool) -> Result<()> {
        writeln!(out, "cryptoplay repl, type `help` for commands")?;
        let mut lines = input.lines();
        loop {
            if prompt {
                write!(out, "> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.context("reading repl input")?;
            match self.handle(line.trim(), &mut out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => {
                    warn!(command = line.trim(), "repl command failed");
                    writeln!(out, "error: {err:#}")?;
                }
            }
        }
        Ok(())
    }

    fn handle(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }
        let (cmd, rest) = split_word(line);
        debug!(cmd, "repl command");
        match cmd {
            "help" | "?" => writeln!(out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            "hash" => {
                for algorithm in HashAlgorithm::ALL {
                    writeln!(out, "{:<10} {}", algorithm.name(), algorithm.digest_hex(rest))?;
                }
            }
            "merkle" => self.merkle_cmd(rest, out)?,
            "sign" => self.sign_cmd(rest, out)?,
            "paillier" => self.paillier_cmd(rest, out)?,
            other => bail!("unknown command {other:?}, try `help`"),
        }
        Ok(Flow::Continue)
    }

    fn merkle_cmd(&mut self, args: &str, out: &mut impl Write) -> Result<()> {
        let (action, rest) = split_word(args);
        match action {
            "" | "show" => {}
            "add" => {
                if !self.merkle.add(rest)? {
                    writeln!(out, "(empty leaf ignored)")?;
                }
            }
            "edit" => {
                let (index, value) = split_word(rest);
                self.merkle.edit(parse_index(index)?, value)?;
            }
            "remove" => {
                if !self.merkle.remove(parse_index(rest)?)? {
                    writeln!(out, "(not removed, a tree keeps at least two leaves)")?;
                }
            }
            "select" => self.merkle.select(parse_index(rest)?)?,
            other => bail!("unknown merkle action {other:?}"),
        }
        self.show_merkle(out)
    }

    fn show_merkle(&self, out: &mut impl Write) -> Result<()> {
        let selected = self.merkle.selected();
        for (i, leaf) in self.merkle.leaves().iter().enumerate() {
            let marker = if i == selected { '*' } else { ' ' };
            writeln!(out, "{marker}[{i}] {leaf}")?;
        }
        writeln!(out, "root  {}", self.merkle.root_hex())?;
        for step in self.merkle.proof()?.steps() {
            writeln!(out, "  {step}")?;
        }
        let valid = self.merkle.proof_valid()?;
        writeln!(out, "proof {}", if valid { "valid" } else { "invalid" })?;
        Ok(())
    }

    fn sign_cmd(&mut self, args: &str, out: &mut impl Write) -> Result<()> {
        let (scheme, rest) = split_word(args);
        let scheme: SchemeKind = scheme.parse().map_err(|err: String| anyhow!(err))?;
        let (action, rest) = split_word(rest);
        let session = self.signers.get(scheme);
        match action {
            "" | "show" => {}
            "keygen" => session.generate()?,
            "message" => session.set_message(rest),
            "sign" => {
                if !session.sign()? {
                    writeln!(out, "(generate a key first)")?;
                }
            }
            "verify" => {
                if session.verify()?.is_none() {
                    writeln!(out, "(sign something first)")?;
                }
            }
            other => bail!("unknown sign action {other:?}"),
        }

        writeln!(out, "scheme    {}", session.scheme())?;
        writeln!(out, "message   {}", session.message())?;
        if let Some(keys) = session.keys() {
            writeln!(out, "public    {}", keys.public_hex())?;
        }
        if let Some(signature) = session.signature() {
            writeln!(out, "signature {}", hex::encode(signature))?;
        }
        if let Some(valid) = session.verdict() {
            writeln!(out, "verdict   {}", if valid { "valid" } else { "invalid" })?;
        }
        Ok(())
    }

    fn paillier_cmd(&mut self, args: &str, out: &mut impl Write) -> Result<()> {
        let (action, rest) = split_word(args);
        let session = &mut self.paillier;
        match action {
            "" | "show" => {}
            "keygen" => session.generate()?,
            "set" => {
                let (a, b) = split_word(rest);
                if a.is_empty() || b.is_empty() {
                    bail!("usage: paillier set <a> <b>");
                }
                session.set_plaintexts(a, b);
            }
            "encrypt" => {
                if !session.encrypt()? {
                    writeln!(out, "(generate keys first)")?;
                }
            }
            "add" => {
                if session.add_and_decrypt()?.is_none() {
                    writeln!(out, "(encrypt first)")?;
                }
            }
            other => bail!("unknown paillier action {other:?}"),
        }

        let (a, b) = session.plaintexts();
        writeln!(out, "keys      {}", if session.has_keys() { "ready" } else { "none" })?;
        writeln!(out, "plaintext {a} + {b}")?;
        if let Some((c1, c2)) = session.ciphertexts() {
            writeln!(out, "E(a)      {c1}")?;
            writeln!(out, "E(b)      {c2}")?;
        }
        if let Some(sum) = session.sum() {
            writeln!(out, "E(a)*E(b) {sum}")?;
        }
        if let Some(decrypted) = session.decrypted() {
            writeln!(out, "decrypted {decrypted}")?;
        }
        Ok(())
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (s, ""),
    }
}

fn parse_index(s: &str) -> Result<usize> {
    s.trim()
        .parse()
        .with_context(|| format!("expected a leaf index, got {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(script: &str) -> String {
        let mut repl = Repl::new(256).unwrap();
        let mut out = Vec::new();
        repl.run(script.as_bytes(), &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn split_word_handles_extra_spaces() {
        assert_eq!(split_word("  add   Eve pays  "), ("add", "Eve pays"));
        assert_eq!(split_word("show"), ("show", ""));
        assert_eq!(split_word(""), ("", ""));
    }

    #[test]
    fn merkle_commands_update_the_tree() {
        let out = drive("merkle\nmerkle add Eve pays Frank 3 BTC\nmerkle select 4\n");
        assert!(out.contains("*[0] Alice pays Bob 1 BTC"));
        assert!(out.contains("*[4] Eve pays Frank 3 BTC"));
        assert!(out.contains("proof valid"));
        assert!(!out.contains("error:"));
    }

    #[test]
    fn remove_stops_at_two_leaves() {
        let out = drive("merkle remove 0\nmerkle remove 0\nmerkle remove 0\n");
        assert_eq!(out.matches("(not removed").count(), 1);
    }

    #[test]
    fn errors_do_not_end_the_loop() {
        let out = drive("bogus\nmerkle select 99\nhash abc\nquit\nhash never\n");
        assert_eq!(out.matches("error:").count(), 2);
        assert!(out.contains(
            "sha256     ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        ));
        assert!(!out.contains(&HashAlgorithm::Sha256.digest_hex("never")));
    }

    #[test]
    fn sign_flow_reports_verdicts() {
        let out = drive(
            "sign eddsa sign\nsign eddsa keygen\nsign eddsa sign\nsign eddsa verify\n\
             sign eddsa message tampered\nsign eddsa verify\n",
        );
        assert!(out.contains("(generate a key first)"));
        assert!(out.contains("verdict   valid"));
        assert!(out.contains("verdict   invalid"));
    }

    #[test]
    fn paillier_flow_adds_under_encryption() {
        let out = drive("paillier encrypt\npaillier keygen\npaillier set 20 22\npaillier encrypt\npaillier add\n");
        assert!(out.contains("(generate keys first)"));
        assert!(out.contains("decrypted 42"));
    }
}
