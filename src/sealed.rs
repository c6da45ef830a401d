//! Password-protected payloads stored as ordinary files.
//!
//! The library ships no cipher. Callers plug one in through [`PayloadCipher`]; the helpers only
//! take care of moving the sealed bytes through a file handle.

use log::debug;

use crate::error::Result;
use crate::facade::Fs;

/// Symmetric, password-based encryption of a whole payload.
pub trait PayloadCipher {
    fn encrypt(&self, plaintext: &[u8], password: &str) -> Vec<u8>;

    /// Fails with `Authentication` when `password` is wrong or `ciphertext` was altered.
    fn decrypt(&self, ciphertext: &[u8], password: &str) -> Result<Vec<u8>>;
}

/// Encrypts `plaintext` and stores it as `name`, replacing any previous file.
pub fn write_sealed(
    fs: &Fs,
    name: &str,
    plaintext: &[u8],
    cipher: &dyn PayloadCipher,
    password: &str,
) -> Result<()> {
    let sealed = cipher.encrypt(plaintext, password);
    let file = fs.create(name)?;
    file.write(&sealed)?;
    file.sync()?;
    file.close()?;
    debug!("sealed {name} ({} bytes)", sealed.len());
    Ok(())
}

/// Reads `name` and decrypts it.
pub fn read_sealed(
    fs: &Fs,
    name: &str,
    cipher: &dyn PayloadCipher,
    password: &str,
) -> Result<Vec<u8>> {
    let file = fs.open(name)?;
    let sealed = file.read_to_end()?;
    file.close()?;
    cipher.decrypt(&sealed, password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, VfsError};
    use crate::storage::{MemoryStore, StorageBackend};
    use std::sync::Arc;

    /// XOR with the password plus a one-byte checksum of the plaintext. Not a cipher.
    struct XorCipher;

    fn checksum(data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
    }

    fn xor(data: &[u8], password: &str) -> Vec<u8> {
        let key = password.as_bytes();
        data.iter()
            .enumerate()
            .map(|(i, b)| b ^ key[i % key.len()])
            .collect()
    }

    impl PayloadCipher for XorCipher {
        fn encrypt(&self, plaintext: &[u8], password: &str) -> Vec<u8> {
            let mut out = xor(plaintext, password);
            out.push(checksum(plaintext));
            out
        }

        fn decrypt(&self, ciphertext: &[u8], password: &str) -> Result<Vec<u8>> {
            let (sum, body) = ciphertext.split_last().ok_or(VfsError::Authentication)?;
            let sum = *sum;
            let plaintext = xor(body, password);
            if checksum(&plaintext) != sum {
                return Err(VfsError::Authentication);
            }
            Ok(plaintext)
        }
    }

    fn setup_fs() -> Fs {
        Fs::key_value(StorageBackend::new(Arc::new(MemoryStore::new())))
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let fs = setup_fs();
        write_sealed(&fs, "secret", b"attack at dawn", &XorCipher, "hunter2")?;

        assert_ne!(fs.open("secret")?.read_to_end()?, b"attack at dawn");
        assert_eq!(read_sealed(&fs, "secret", &XorCipher, "hunter2")?, b"attack at dawn");
        Ok(())
    }

    #[test]
    fn test_wrong_password() -> Result<()> {
        let fs = setup_fs();
        write_sealed(&fs, "secret", b"attack at dawn", &XorCipher, "hunter2")?;

        let err = read_sealed(&fs, "secret", &XorCipher, "letmein").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let fs = setup_fs();
        let err = read_sealed(&fs, "nothing", &XorCipher, "pw").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
