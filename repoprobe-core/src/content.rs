//! Random content used as scenario inputs

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::Result;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Prefix of every generated commit message
pub const COMMIT_MESSAGE_PREFIX: &str = "Random commit message: ";

/// `len` random ASCII letters
pub fn random_text<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect()
}

/// A commit message with `len` random letters after the fixed prefix
pub fn commit_message<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    format!("{}{}", COMMIT_MESSAGE_PREFIX, random_text(rng, len))
}

/// Write a throwaway text file into `dir`
///
/// The file is named `<len letters>.txt` and holds `len` lines of `len`
/// letters each. Returns the path of the file.
pub fn write_random_file<R: Rng + ?Sized>(rng: &mut R, dir: &Path, len: usize) -> Result<PathBuf> {
    let path = dir.join(format!("{}.txt", random_text(rng, len)));

    let mut contents = String::with_capacity(len * (len + 1));
    for _ in 0..len {
        contents.push_str(&random_text(rng, len));
        contents.push('\n');
    }

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(contents.as_bytes())?;

    tracing::debug!(path = %path.display(), "Wrote random file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    #[test]
    fn test_random_text_letters_only() {
        let mut rng = StdRng::seed_from_u64(7);
        let text = random_text(&mut rng, 64);
        assert_eq!(text.len(), 64);
        assert!(text.chars().all(|c| c.is_ascii_alphabetic()));
        assert_eq!(random_text(&mut rng, 0), "");
    }

    #[test]
    fn test_commit_message_format() {
        let mut rng = StdRng::seed_from_u64(1);
        let msg = commit_message(&mut rng, 10);
        let suffix = msg.strip_prefix(COMMIT_MESSAGE_PREFIX).unwrap();
        assert_eq!(suffix.len(), 10);
        assert!(suffix.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let a = random_text(&mut StdRng::seed_from_u64(42), 20);
        let b = random_text(&mut StdRng::seed_from_u64(42), 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_random_file() {
        let dir = TempDir::new().unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let path = write_random_file(&mut rng, dir.path(), 10).unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
        assert_eq!(path.extension().unwrap(), "txt");
        assert_eq!(path.file_stem().unwrap().len(), 10);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.len() == 10));
        assert!(contents.ends_with('\n'));
    }
}
