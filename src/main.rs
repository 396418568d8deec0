use std::{
    fs,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use cryptoplay_core::{
    commitment::SecretCommitment,
    encoding::{decode_hex, decode_hex_array},
    hash::HashAlgorithm,
    merkle::{verify_proof, HexSha256, MerkleHasher, MerkleTree, ProofStep, SortedKeccak256},
    paillier::{self, PaillierPrivateKey, PaillierPublicKey, DEFAULT_MODULUS_BITS},
    shares::{self, DEFAULT_PARTS},
    signature::SchemeKind,
    speed::{self, DEFAULT_MESSAGE},
};
use num_bigint::BigUint;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zeroize::Zeroizing;

mod repl;
mod report;
mod session;

use report::{
    emit, CommitmentReport, DigestLine, HashReport, KeyReport, NumberReport, OutputFormat,
    PaillierDemoReport, ProofReport, SharesReport, SignatureReport, SpeedReport,
    TreeReport, VerdictReport,
};

//==================== Аргументы ====================//

#[derive(Parser, Debug)]
#[command(
    name = "cryptoplay",
    version,
    about = "Playgrounds for blockchain cryptography: hashing, Merkle proofs, signatures, Paillier"
)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, global = true, env = "CRYPTOPLAY_OUTPUT", default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long, global = true)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Digest text with SHA-256, Keccak-256 and BLAKE3
    Hash {
        text: String,
        /// Only this algorithm
        #[arg(long, value_enum)]
        algorithm: Option<HashArg>,
    },
    /// Build Merkle trees, produce and check inclusion proofs
    #[command(subcommand)]
    Merkle(MerkleCommand),
    /// Generate a signing key pair
    Keygen {
        #[arg(long, default_value = "ecdsa", help = SCHEME_HELP)]
        scheme: SchemeKind,
        /// Also write sk.hex / pk.hex into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Sign a message
    Sign {
        #[arg(long, default_value = "ecdsa", help = SCHEME_HELP)]
        scheme: SchemeKind,
        /// Secret key in hex
        #[arg(long, env = "CRYPTOPLAY_SECRET_HEX", hide_env_values = true)]
        secret_hex: String,
        message: String,
    },
    /// Verify a signature (exit status 1 when invalid)
    Verify {
        #[arg(long, default_value = "ecdsa", help = SCHEME_HELP)]
        scheme: SchemeKind,
        #[arg(long)]
        public_hex: String,
        #[arg(long)]
        signature_hex: String,
        message: String,
    },
    /// Additively homomorphic encryption
    #[command(subcommand)]
    Paillier(PaillierCommand),
    /// Simulated key shares and "threshold" signing
    #[command(subcommand)]
    Shares(SharesCommand),
    /// Commit to a secret and check guesses against it
    #[command(subcommand)]
    Commit(CommitCommand),
    /// Time sign/verify for each scheme
    Speed(SpeedArgs),
    /// Interactive sessions on stdin
    Repl {
        #[arg(long, env = "CRYPTOPLAY_PAILLIER_BITS", default_value_t = DEFAULT_MODULUS_BITS)]
        bits: usize,
    },
}

const SCHEME_HELP: &str = "Signature scheme: ecdsa, schnorr, eddsa or bls";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HashArg {
    Sha256,
    Keccak256,
    Blake3,
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Sha256 => HashAlgorithm::Sha256,
            HashArg::Keccak256 => HashAlgorithm::Keccak256,
            HashArg::Blake3 => HashAlgorithm::Blake3,
        }
    }
}

/// Node hashing rule of a tree.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Layout {
    /// sha256 over the hex text of both children
    #[default]
    HexSha256,
    /// keccak256 over the sorted raw children
    SortedKeccak256,
}

#[derive(Args, Debug)]
struct TreeArgs {
    #[arg(long, value_enum, default_value_t)]
    layout: Layout,
    /// Leaf values, in order
    #[arg(required = true)]
    leaves: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum MerkleCommand {
    /// Print the root
    Root(TreeArgs),
    /// Print every level, root first
    Levels(TreeArgs),
    /// Inclusion proof for one leaf
    Proof {
        #[arg(long)]
        index: usize,
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Check a leaf against a root (exit status 1 when invalid)
    Verify {
        #[arg(long, value_enum, default_value_t)]
        layout: Layout,
        #[arg(long)]
        leaf: String,
        #[arg(long)]
        root: String,
        /// `left:<hex>` or `right:<hex>`, leaf level first
        #[arg(long = "step")]
        steps: Vec<ProofStep>,
    },
}

#[derive(Subcommand, Debug)]
enum PaillierCommand {
    /// Generate a key pair (decimal n, lambda, mu)
    Keygen {
        #[arg(long, env = "CRYPTOPLAY_PAILLIER_BITS", default_value_t = DEFAULT_MODULUS_BITS)]
        bits: usize,
    },
    /// Encrypt a plaintext under n
    Encrypt {
        #[arg(long)]
        n: String,
        plaintext: String,
    },
    /// Multiply two ciphertexts, adding their plaintexts
    Add {
        #[arg(long)]
        n: String,
        left: String,
        right: String,
    },
    /// Decrypt with the private key
    Decrypt {
        #[arg(long)]
        n: String,
        #[arg(long)]
        lambda: String,
        #[arg(long)]
        mu: String,
        ciphertext: String,
    },
    /// Generate keys, encrypt a and b, add, decrypt
    Demo {
        #[arg(long, env = "CRYPTOPLAY_PAILLIER_BITS", default_value_t = DEFAULT_MODULUS_BITS)]
        bits: usize,
        #[arg(default_value = "5")]
        a: String,
        #[arg(default_value = "7")]
        b: String,
    },
}

#[derive(Subcommand, Debug)]
enum SharesCommand {
    /// Cut a hex secret into contiguous shares
    Split {
        #[arg(long, default_value_t = DEFAULT_PARTS)]
        parts: usize,
        #[arg(long, env = "CRYPTOPLAY_SECRET_HEX", hide_env_values = true)]
        secret_hex: String,
    },
    /// Join every share and sign once
    Sign {
        #[arg(long, default_value = "eddsa", help = SCHEME_HELP)]
        scheme: SchemeKind,
        /// Shares in order, repeat the flag
        #[arg(long = "share", required = true)]
        shares: Vec<String>,
        message: String,
    },
}

#[derive(Subcommand, Debug)]
enum CommitCommand {
    /// Print the commitment to a secret
    Store { secret: String },
    /// Check a guess against a commitment (exit status 1 when wrong)
    Prove {
        #[arg(long)]
        commitment: SecretCommitment,
        guess: String,
    },
}

#[derive(Args, Debug)]
struct SpeedArgs {
    /// Schemes to time, all when omitted
    #[arg(long = "scheme", help = SCHEME_HELP)]
    schemes: Vec<SchemeKind>,
    #[arg(long, default_value_t = 10)]
    iterations: u32,
    #[arg(long, default_value = DEFAULT_MESSAGE)]
    message: String,
}

//==================== Логирование ====================//

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();
}

//==================== Общие утилиты ====================//

/// Result of a command: verifications that fail exit with status 1.
enum Outcome {
    Done,
    Invalid,
}

impl Outcome {
    fn from_valid(valid: bool) -> Self {
        if valid {
            Outcome::Done
        } else {
            Outcome::Invalid
        }
    }
}

fn number(field: &'static str, value: &str) -> Result<BigUint> {
    Ok(paillier::parse_biguint(field, value)?)
}

fn write_all(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn tree_report<H: MerkleHasher>(leaves: &[String]) -> Result<TreeReport> {
    let tree = MerkleTree::<H>::build(leaves).context("building merkle tree")?;
    Ok(TreeReport {
        layout: H::NAME,
        leaves: leaves.to_vec(),
        levels: tree
            .levels()
            .iter()
            .map(|level| level.iter().map(hex::encode).collect())
            .collect(),
        root: tree.root_hex(),
    })
}

fn proof_report<H: MerkleHasher>(leaves: &[String], index: usize) -> Result<ProofReport> {
    let tree = MerkleTree::<H>::build(leaves).context("building merkle tree")?;
    let proof = tree.proof(index)?;
    let leaf = leaves[index].clone();
    let valid = tree.verify(leaf.as_bytes(), &proof);
    Ok(ProofReport {
        layout: H::NAME,
        leaf,
        root: tree.root_hex(),
        proof,
        valid,
    })
}

//==================== Команды ====================//

fn merkle_cmd(cmd: MerkleCommand, out: &mut impl Write, format: OutputFormat) -> Result<Outcome> {
    match cmd {
        MerkleCommand::Root(args) => {
            let report = match args.layout {
                Layout::HexSha256 => tree_report::<HexSha256>(&args.leaves)?,
                Layout::SortedKeccak256 => tree_report::<SortedKeccak256>(&args.leaves)?,
            };
            emit(out, format, &report.root_only())?;
        }
        MerkleCommand::Levels(args) => {
            let report = match args.layout {
                Layout::HexSha256 => tree_report::<HexSha256>(&args.leaves)?,
                Layout::SortedKeccak256 => tree_report::<SortedKeccak256>(&args.leaves)?,
            };
            emit(out, format, &report)?;
        }
        MerkleCommand::Proof { index, tree } => {
            let report = match tree.layout {
                Layout::HexSha256 => proof_report::<HexSha256>(&tree.leaves, index)?,
                Layout::SortedKeccak256 => proof_report::<SortedKeccak256>(&tree.leaves, index)?,
            };
            debug!(index, steps = report.proof.len(), "proof built");
            emit(out, format, &report)?;
        }
        MerkleCommand::Verify {
            layout,
            leaf,
            root,
            steps,
        } => {
            let root = decode_hex_array::<32>("root", &root)?;
            let valid = match layout {
                Layout::HexSha256 => verify_proof::<HexSha256>(leaf.as_bytes(), &steps, &root),
                Layout::SortedKeccak256 => {
                    verify_proof::<SortedKeccak256>(leaf.as_bytes(), &steps, &root)
                }
            };
            debug!(steps = ?report::render_steps(&steps), valid, "checked merkle proof");
            emit(out, format, &VerdictReport { subject: "merkle proof", valid })?;
            return Ok(Outcome::from_valid(valid));
        }
    }
    Ok(Outcome::Done)
}

fn keygen_cmd(
    scheme: SchemeKind,
    out_dir: Option<&Path>,
    out: &mut impl Write,
    format: OutputFormat,
) -> Result<()> {
    let pair = scheme.generate()?;
    let secret_hex = pair.secret_hex();
    if let Some(dir) = out_dir {
        write_all(&dir.join("sk.hex"), secret_hex.as_bytes())?;
        write_all(&dir.join("pk.hex"), pair.public_hex().as_bytes())?;
        info!(scheme = %scheme, dir = %dir.display(), "keypair written");
    }
    emit(
        out,
        format,
        &KeyReport {
            scheme: scheme.name(),
            secret_hex: secret_hex.to_string(),
            public_hex: pair.public_hex(),
        },
    )
}

fn paillier_cmd(cmd: PaillierCommand, out: &mut impl Write, format: OutputFormat) -> Result<()> {
    match cmd {
        PaillierCommand::Keygen { bits } => {
            info!(bits, "generating paillier key pair");
            let (_, private) = paillier::generate_keypair(bits)?;
            emit(out, format, &private.view())
        }
        PaillierCommand::Encrypt { n, plaintext } => {
            let public = PaillierPublicKey::new(number("n", &n)?)?;
            let c = public.encrypt(&number("plaintext", &plaintext)?)?;
            emit(out, format, &NumberReport { label: "ciphertext", value: c.to_string() })
        }
        PaillierCommand::Add { n, left, right } => {
            let public = PaillierPublicKey::new(number("n", &n)?)?;
            let sum = public.add(&number("left", &left)?, &number("right", &right)?)?;
            emit(out, format, &NumberReport { label: "ciphertext", value: sum.to_string() })
        }
        PaillierCommand::Decrypt {
            n,
            lambda,
            mu,
            ciphertext,
        } => {
            let private = PaillierPrivateKey::from_parts(
                number("n", &n)?,
                number("lambda", &lambda)?,
                number("mu", &mu)?,
            )?;
            let m = private.decrypt(&number("ciphertext", &ciphertext)?)?;
            emit(out, format, &NumberReport { label: "plaintext", value: m.to_string() })
        }
        PaillierCommand::Demo { bits, a, b } => {
            let (public, private) = paillier::generate_keypair(bits)?;
            let (ma, mb) = (number("a", &a)?, number("b", &b)?);
            let (ca, cb) = (public.encrypt(&ma)?, public.encrypt(&mb)?);
            let sum = public.add(&ca, &cb)?;
            let decrypted = private.decrypt(&sum)?;
            debug!(%decrypted, "paillier demo");
            emit(
                out,
                format,
                &PaillierDemoReport {
                    bits: public.bits(),
                    a: ma.to_string(),
                    b: mb.to_string(),
                    ciphertext_a: ca.to_string(),
                    ciphertext_b: cb.to_string(),
                    ciphertext_sum: sum.to_string(),
                    decrypted_sum: decrypted.to_string(),
                },
            )
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let format = cli.format();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Hash { text, algorithm } => {
            let algorithms: Vec<HashAlgorithm> = match algorithm {
                Some(one) => vec![one.into()],
                None => HashAlgorithm::ALL.to_vec(),
            };
            let report = HashReport {
                digests: algorithms
                    .into_iter()
                    .map(|algorithm| DigestLine {
                        algorithm: algorithm.name(),
                        hex: algorithm.digest_hex(&text),
                    })
                    .collect(),
                input: text,
            };
            emit(&mut out, format, &report)?;
        }
        Command::Merkle(cmd) => return merkle_cmd(cmd, &mut out, format),
        Command::Keygen { scheme, out_dir } => {
            keygen_cmd(scheme, out_dir.as_deref(), &mut out, format)?
        }
        Command::Sign {
            scheme,
            secret_hex,
            message,
        } => {
            let secret = zeroize_hex("secret key", &secret_hex)?;
            let signature = scheme.sign(&secret, message.as_bytes())?;
            emit(
                &mut out,
                format,
                &SignatureReport {
                    scheme: scheme.name(),
                    message,
                    signature_hex: hex::encode(signature),
                },
            )?;
        }
        Command::Verify {
            scheme,
            public_hex,
            signature_hex,
            message,
        } => {
            let public = decode_hex("public key", &public_hex)?;
            let signature = decode_hex("signature", &signature_hex)?;
            let valid = scheme.verify(&public, message.as_bytes(), &signature)?;
            emit(&mut out, format, &VerdictReport { subject: "signature", valid })?;
            return Ok(Outcome::from_valid(valid));
        }
        Command::Paillier(cmd) => paillier_cmd(cmd, &mut out, format)?,
        Command::Shares(SharesCommand::Split { parts, secret_hex }) => {
            let shares = shares::split_hex(&secret_hex, parts)?;
            emit(&mut out, format, &SharesReport { parts, shares })?;
        }
        Command::Shares(SharesCommand::Sign {
            scheme,
            shares,
            message,
        }) => {
            let signed = shares::threshold_sign(scheme, &shares, message.as_bytes())?;
            emit(&mut out, format, &signed)?;
        }
        Command::Commit(CommitCommand::Store { secret }) => {
            let commitment = SecretCommitment::commit(&secret);
            emit(
                &mut out,
                format,
                &CommitmentReport {
                    commitment: commitment.to_string(),
                },
            )?;
        }
        Command::Commit(CommitCommand::Prove { commitment, guess }) => {
            let valid = commitment.prove(&guess);
            emit(&mut out, format, &VerdictReport { subject: "secret", valid })?;
            return Ok(Outcome::from_valid(valid));
        }
        Command::Speed(args) => {
            let schemes = if args.schemes.is_empty() {
                SchemeKind::ALL.to_vec()
            } else {
                args.schemes
            };
            let timings = speed::compare(&schemes, args.message.as_bytes(), args.iterations)?;
            emit(
                &mut out,
                format,
                &SpeedReport {
                    message: args.message,
                    timings,
                },
            )?;
        }
        Command::Repl { bits } => {
            drop(out);
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            repl::Repl::new(bits)?.run(stdin.lock(), io::stdout().lock(), prompt)?;
        }
    }
    Ok(Outcome::Done)
}

fn zeroize_hex(field: &'static str, value: &str) -> Result<Zeroizing<Vec<u8>>> {
    Ok(Zeroizing::new(decode_hex(field, value)?))
}

//==================== main ====================//

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Invalid) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
