//! Command implementations.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use clap::Subcommand;
use lipmaa_core::{
    Author, BatchOnly, Clock, MemoryLog, PendingEntry, VerifyConfig, build_chain, path_between,
    path_to_root, skip_target, verify_between, verify_chain,
};
use lipmaa_crypto::{Ed25519Signer, Ed25519Verifier, Signer};
use lipmaa_proto::{Content, Entry, encoding};

use crate::error::CliError;

/// `lipmaa` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the skip target of a sequence number
    Link {
        /// Sequence number (1-based)
        sequence: u64,
    },

    /// Print the skip path from a sequence number back to the root
    Path {
        /// Sequence number to start from
        sequence: u64,

        /// Stop at this sequence instead of the root
        #[arg(long)]
        to: Option<u64>,
    },

    /// Build a signed log and write it to a file
    Build {
        /// Number of entries
        #[arg(long)]
        count: u64,

        /// Author label committed into every entry
        #[arg(long, default_value = "anonymous")]
        label: String,

        /// Signing key seed: 64 hex digits, or "random"
        #[arg(long, default_value = "random")]
        seed: String,

        /// Output file (CBOR)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Verify a log file along its skip links
    Verify {
        /// Input file (CBOR)
        #[arg(short, long)]
        input: PathBuf,

        /// Sequence to verify from (default: latest)
        #[arg(long)]
        from: Option<u64>,

        /// Verify only back to this sequence, mixing skip links and backlinks
        #[arg(long)]
        to: Option<u64>,

        /// Accept skip links that miss the lipmaa target (not with --to)
        #[arg(long)]
        relaxed: bool,
    },
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command completed; any verified chain holds.
    Success,
    /// `verify` found a broken chain.
    InvalidChain,
}

/// Execute `command`, writing human-readable output to `out`.
pub async fn run<C, W>(command: Command, clock: &C, out: &mut W) -> Result<Outcome, CliError>
where
    C: Clock + ?Sized,
    W: Write,
{
    match command {
        Command::Link { sequence } => {
            writeln!(out, "{}", skip_target(sequence))?;
            Ok(Outcome::Success)
        },
        Command::Path { sequence, to } => {
            let path = match to {
                None => path_to_root(sequence),
                Some(to) => path_between(sequence, to)
                    .ok_or(CliError::InvalidRange { from: sequence, to })?,
            };
            writeln!(out, "{}", join(&path))?;
            Ok(Outcome::Success)
        },
        Command::Build { count, label, seed, output } => {
            build(count, label, &seed, output, clock, out).await
        },
        Command::Verify { input, from, to, relaxed } => {
            if let (Some(to), true) = (to, relaxed) {
                return Err(CliError::RelaxedRange { to });
            }
            let config = if relaxed { VerifyConfig::relaxed() } else { VerifyConfig::strict() };
            verify(&input, from, to, config, out).await
        },
    }
}

fn join(sequences: &[u64]) -> String {
    sequences.iter().map(u64::to_string).collect::<Vec<_>>().join(" ")
}

/// Parse a 32-byte seed from hex, or draw one from the OS for `random`.
pub fn parse_seed(seed: &str) -> Result<[u8; 32], CliError> {
    if seed == "random" {
        let mut bytes = [0u8; 32];
        getrandom::fill(&mut bytes).map_err(|e| CliError::Random(e.to_string()))?;
        return Ok(bytes);
    }

    let bytes = hex::decode(seed).map_err(|e| CliError::InvalidSeed(e.to_string()))?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| CliError::InvalidSeed(format!("expected 32 bytes, got {}", bytes.len())))
}

async fn build<C, W>(
    count: u64,
    label: String,
    seed: &str,
    output: PathBuf,
    clock: &C,
    out: &mut W,
) -> Result<Outcome, CliError>
where
    C: Clock + ?Sized,
    W: Write,
{
    let signer = Ed25519Signer::from_seed(parse_seed(seed)?);
    let author = Author::new(signer.author_id(), label);
    let pending: Vec<PendingEntry> =
        (1..=count).map(|n| PendingEntry::new(Content::text(format!("entry {n}")))).collect();

    let entries = build_chain(&author, &signer, clock, &BatchOnly, None, &pending).await?;

    let bytes = encoding::to_canonical(&entries)?;
    fs::write(&output, bytes).map_err(|source| CliError::File { path: output.clone(), source })?;

    tracing::info!("Wrote {} entries to {}", entries.len(), output.display());
    writeln!(out, "author: {}", author.id)?;
    if let Some(head) = entries.last() {
        writeln!(out, "head: {} (sequence {})", head.key, head.sequence())?;
    }
    writeln!(out, "wrote {} entries to {}", entries.len(), output.display())?;
    Ok(Outcome::Success)
}

/// Load a log file written by `build`.
pub fn load_log(input: &Path) -> Result<MemoryLog, CliError> {
    let bytes =
        fs::read(input).map_err(|source| CliError::File { path: input.to_path_buf(), source })?;
    let entries: Vec<Entry> = encoding::from_slice(&bytes)?;
    Ok(MemoryLog::from_entries(entries)?)
}

async fn verify<W: Write>(
    input: &Path,
    from: Option<u64>,
    to: Option<u64>,
    config: VerifyConfig,
    out: &mut W,
) -> Result<Outcome, CliError> {
    let log = load_log(input)?;
    let head = match from {
        Some(sequence) => log.get(sequence).ok_or(CliError::MissingEntry { sequence })?,
        None => log.latest().ok_or(CliError::EmptyLog)?,
    };

    let report = match to {
        Some(to) => verify_between(&head, to, &log, &Ed25519Verifier).await,
        None => verify_chain(&head, &log, &Ed25519Verifier, config).await,
    };

    writeln!(out, "visited: {}", join(&report.visited))?;
    match &report.failure {
        None => {
            writeln!(out, "valid")?;
            Ok(Outcome::Success)
        },
        Some(failure) => {
            writeln!(out, "invalid: {failure}")?;
            Ok(Outcome::InvalidChain)
        },
    }
}
