//! word2vec file codec
//!
//! Reads the binary and text layouts produced by Google's word2vec
//! tool (and gensim), optionally gzip-compressed, and writes the binary
//! layout.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use wordsim_common::{Result, WordSimError};

use crate::store::{EmbeddingStore, EmbeddingStoreBuilder, WordVectors};

const READ_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Upper bound on floats reserved up front; the header is not trusted
/// beyond this, storage grows as entries are actually read.
const MAX_PREALLOCATED_VALUES: usize = 1 << 26;

/// Largest vector dimension accepted from a header
const MAX_DIMENSION: usize = 1 << 16;

/// Options for reading a word2vec file
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Binary layout (true) or text layout (false)
    pub binary: bool,

    /// Read at most this many vectors
    pub limit: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            binary: true,
            limit: None,
        }
    }
}

/// Header line: `<vocab_size> <dimension>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    vocab_size: usize,
    dimension: usize,
}

/// Load a word2vec file from disk. Paths ending in `.gz` are decompressed
/// on the fly.
pub fn load_word2vec_format(path: &Path, options: &LoadOptions) -> Result<EmbeddingStore> {
    let file = File::open(path).map_err(|e| {
        WordSimError::model(format!("Failed to open model {}: {}", path.display(), e))
    })?;

    info!(
        "Loading word vectors from {} (binary={}, limit={:?})",
        path.display(),
        options.binary,
        options.limit
    );
    let started = Instant::now();

    let is_gzip = path.extension().and_then(|s| s.to_str()) == Some("gz");
    let store = if is_gzip {
        read_word2vec(BufReader::with_capacity(READ_BUFFER_SIZE, MultiGzDecoder::new(file)), options)?
    } else {
        read_word2vec(BufReader::with_capacity(READ_BUFFER_SIZE, file), options)?
    };

    info!(
        "Loaded {} word vectors of dimension {} in {:.1?}",
        store.len(),
        store.dim(),
        started.elapsed()
    );

    Ok(store)
}

/// Read a word2vec stream
pub fn read_word2vec<R: BufRead>(mut reader: R, options: &LoadOptions) -> Result<EmbeddingStore> {
    let header = read_header(&mut reader)?;
    let count = match options.limit {
        Some(limit) => header.vocab_size.min(limit),
        None => header.vocab_size,
    };
    debug!(
        "word2vec header: vocab_size={}, dimension={}, reading {}",
        header.vocab_size, header.dimension, count
    );

    let preallocated = count.min(MAX_PREALLOCATED_VALUES / header.dimension);
    let mut builder = EmbeddingStoreBuilder::with_capacity(header.dimension, preallocated);
    let mut vector = vec![0.0_f32; header.dimension];
    let mut duplicates = 0usize;

    for index in 0..count {
        let word = if options.binary {
            read_binary_entry(&mut reader, index, &mut vector)?
        } else {
            read_text_entry(&mut reader, index, &mut vector)?
        };

        if !builder.push(word.as_str(), &vector)? {
            duplicates += 1;
            warn!("duplicate word '{}' in word2vec file, ignoring all but first", word);
        }
    }

    if duplicates > 0 {
        warn!("{} duplicate words skipped", duplicates);
    }

    builder.build()
}

fn read_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    if line.is_empty() {
        return Err(WordSimError::model("empty model file"));
    }

    let line = String::from_utf8(line)
        .map_err(|_| WordSimError::model("header line is not valid UTF-8"))?;
    let mut parts = line.split_whitespace();
    let mut field = |name: &str| -> Result<usize> {
        parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| WordSimError::model(format!("invalid header {:?}: bad {}", line.trim_end(), name)))
    };

    let vocab_size = field("vocabulary size")?;
    let dimension = field("dimension")?;
    if dimension == 0 {
        return Err(WordSimError::model("vector dimension must be greater than 0"));
    }
    if dimension > MAX_DIMENSION {
        return Err(WordSimError::model(format!(
            "vector dimension {} exceeds the supported maximum of {}",
            dimension, MAX_DIMENSION
        )));
    }

    Ok(Header {
        vocab_size,
        dimension,
    })
}

fn unexpected_eof(index: usize) -> WordSimError {
    WordSimError::model(format!(
        "unexpected end of input at entry {}; is the vocabulary count incorrect or the file damaged?",
        index
    ))
}

fn read_binary_entry<R: BufRead>(reader: &mut R, index: usize, vector: &mut [f32]) -> Result<String> {
    let mut word = Vec::new();
    reader.read_until(b' ', &mut word)?;
    if word.pop() != Some(b' ') {
        return Err(unexpected_eof(index));
    }

    // Google's layout puts a newline after each vector
    let start = word.iter().position(|&b| b != b'\n').unwrap_or(word.len());
    let word = String::from_utf8(word[start..].to_vec()).map_err(|_| {
        WordSimError::model(format!("word at entry {} is not valid UTF-8", index))
    })?;

    let mut bytes = vec![0u8; vector.len() * 4];
    reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => unexpected_eof(index),
        _ => WordSimError::Io(e),
    })?;

    for (value, chunk) in vector.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    Ok(word)
}

fn read_text_entry<R: BufRead>(reader: &mut R, index: usize, vector: &mut [f32]) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(unexpected_eof(index));
    }

    let invalid = || {
        WordSimError::model(format!(
            "invalid vector on line {} (is this really the text format?)",
            index + 2
        ))
    };

    let mut parts = line.trim_end().split(' ');
    let word = parts.next().filter(|w| !w.is_empty()).ok_or_else(invalid)?;

    let mut filled = 0;
    for part in parts {
        let slot = vector.get_mut(filled).ok_or_else(invalid)?;
        *slot = part.parse().map_err(|_| invalid())?;
        filled += 1;
    }
    if filled != vector.len() {
        return Err(invalid());
    }

    Ok(word.to_string())
}

/// Write a store in word2vec binary layout
pub fn write_word2vec<W: Write>(store: &EmbeddingStore, mut writer: W) -> Result<()> {
    writeln!(writer, "{} {}", store.len(), store.dim())?;

    for (word, row) in store.words().iter().zip(store.vectors().rows()) {
        if word.is_empty() || word.contains(char::is_whitespace) {
            return Err(WordSimError::model(format!(
                "word {:?} cannot be stored in word2vec format",
                word
            )));
        }

        writer.write_all(word.as_bytes())?;
        writer.write_all(b" ")?;
        for value in row.iter() {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}

/// Save a store to disk in word2vec binary layout
///
/// Writes to a temporary sibling file first and renames it into place.
pub fn save_word2vec_format(store: &EmbeddingStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("tmp");
    info!(
        "Saving {} word vectors to {}",
        store.len(),
        path.display()
    );

    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::with_capacity(READ_BUFFER_SIZE, file);
    if let Err(e) = write_word2vec(store, &mut writer) {
        drop(writer);
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    let file = writer
        .into_inner()
        .map_err(|e| WordSimError::Io(e.into_error()))?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)?;
    info!("Model saved: {}", path.display());

    Ok(())
}
