//! Device reservation lease
//!
//! Coordinates accelerator selection across independently launched processes
//! through an advisory-locked state file. The read-decide-write cycle happens
//! entirely under an exclusive lock, so two processes can never both observe
//! "unreserved". Dropping the lease releases the reservation.
//!
//! State-file protocol: `"server"` means a shared host where device 0 is
//! always handed out and never reserved; `"0"` means device 0 is taken, so
//! the caller falls back to device 1; anything else (normally empty) means
//! device 0 is free and gets reserved by writing `"0"`.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// RAII reservation over the shared device-state file
#[derive(Debug)]
pub struct DeviceLease {
    path: PathBuf,
    device: u32,
    reserved: bool,
}

impl DeviceLease {
    /// Acquire a device: lock the state file exclusively, read the current
    /// reservation, pick a device, and reserve device 0 when it is free.
    pub fn acquire(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()?;

        let mut decide = || -> std::io::Result<(u32, bool)> {
            let mut state = String::new();
            file.read_to_string(&mut state)?;
            match state.as_str() {
                "server" => Ok((0, false)),
                "0" => Ok((1, false)),
                _ => {
                    file.seek(SeekFrom::Start(0))?;
                    file.write_all(b"0")?;
                    file.set_len(1)?;
                    Ok((0, true))
                }
            }
        };
        let outcome = decide();
        FileExt::unlock(&file)?;
        let (device, reserved) = outcome?;

        Ok(Self { path, device, reserved })
    }

    /// Device index this lease resolved to.
    pub fn device(&self) -> u32 {
        self.device
    }

    /// Whether this lease wrote the reservation (and will clear it).
    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    /// State file coordinating the reservation.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn release(&mut self) -> std::io::Result<()> {
        if !self.reserved {
            return Ok(());
        }
        self.reserved = false;

        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        file.lock_exclusive()?;
        let mut state = String::new();
        let outcome = file.read_to_string(&mut state).and_then(|_| {
            // Only clear a reservation this lease wrote; a "server" marker is
            // permanent.
            if state != "server" {
                file.set_len(0)?;
            }
            Ok(())
        });
        FileExt::unlock(&file)?;
        outcome
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            eprintln!("failed to release device lease {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state_file(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("device_state.txt")
    }

    #[test]
    fn test_acquire_empty_state_reserves_device_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_file(&dir);

        let lease = DeviceLease::acquire(&path).unwrap();
        assert_eq!(lease.device(), 0);
        assert!(lease.is_reserved());
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
    }

    #[test]
    fn test_second_acquire_falls_back_to_device_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_file(&dir);

        let first = DeviceLease::acquire(&path).unwrap();
        let second = DeviceLease::acquire(&path).unwrap();
        assert_eq!(first.device(), 0);
        assert_eq!(second.device(), 1);
        assert!(!second.is_reserved());
    }

    #[test]
    fn test_drop_clears_reservation() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_file(&dir);

        {
            let _lease = DeviceLease::acquire(&path).unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "0");
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_unreserved_lease_does_not_clear_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_file(&dir);

        let first = DeviceLease::acquire(&path).unwrap();
        {
            let _second = DeviceLease::acquire(&path).unwrap();
        }
        // Dropping the fallback lease must not clear the first reservation.
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
        drop(first);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_server_state_is_permanent() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_file(&dir);
        fs::write(&path, "server").unwrap();

        {
            let lease = DeviceLease::acquire(&path).unwrap();
            assert_eq!(lease.device(), 0);
            assert!(!lease.is_reserved());
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "server");
    }

    #[test]
    fn test_reacquire_after_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = state_file(&dir);

        drop(DeviceLease::acquire(&path).unwrap());
        let lease = DeviceLease::acquire(&path).unwrap();
        assert_eq!(lease.device(), 0);
        assert!(lease.is_reserved());
    }
}
