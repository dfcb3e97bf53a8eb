use crate::error::{Error, Result};
use crate::utils::address::Target;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

pub const CONF_FILENAME: &str = ".multi_ping_conf";

/// `~/.multi_ping_conf`
pub fn default_conf_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(CONF_FILENAME))
        .ok_or(Error::NoHomeDir)
}

/// Reads every address listed in a config file. Lines that are neither an
/// address nor a range are logged and skipped.
pub fn read_conf<P: AsRef<Path>>(path: P) -> Result<Vec<Ipv4Addr>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut ips = vec![];
    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Target::parse(line) {
            Some(target) => ips.extend(target.addresses()),
            None => {
                if line.contains('-') {
                    tracing::warn!("{} contains illegal ip address, line ignored", line);
                } else {
                    tracing::warn!("{} is not an ip address, ignored", line);
                }
            }
        }
    }
    tracing::debug!("read {} addresses from {}", ips.len(), path.display());
    Ok(ips)
}

/// Overwrites `path` with one address per line.
pub fn write_conf<P: AsRef<Path>>(path: P, ips: &[Ipv4Addr]) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source: std::io::Error| Error::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    for ip in ips {
        writeln!(writer, "{}", ip).map_err(write_error)?;
    }
    writer.flush().map_err(write_error)
}

#[cfg(test)]
pub mod conf_test {
    use crate::error::Error;
    use crate::utils::conf::{read_conf, write_conf, CONF_FILENAME};
    use std::net::Ipv4Addr;

    #[test]
    fn read_conf_skips_bad_lines_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONF_FILENAME);
        std::fs::write(
            &path,
            "10.0.0.9\n\nnot-an-ip\n10.0.0.1-3\n999.1.1.1\n10.0.0.7-10.0.0.300\n",
        )
        .unwrap();
        let ips = read_conf(&path).unwrap();
        let expected: Vec<Ipv4Addr> = ["10.0.0.9", "10.0.0.1", "10.0.0.2", "10.0.0.3"]
            .iter()
            .map(|ip| ip.parse().unwrap())
            .collect();
        assert_eq!(ips, expected);
    }

    #[test]
    fn read_conf_skips_undecodable_line_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONF_FILENAME);
        std::fs::write(&path, b"10.0.0.1\n\xff\xfe bad\n10.0.0.2\r\n").unwrap();
        let expected: Vec<Ipv4Addr> = vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)];
        assert_eq!(read_conf(&path).unwrap(), expected);
    }

    #[test]
    fn write_conf_overwrites_test() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONF_FILENAME);
        std::fs::write(&path, "1.1.1.1\n2.2.2.2\n3.3.3.3\n").unwrap();
        let ips: Vec<Ipv4Addr> = vec!["10.0.0.1".parse().unwrap()];
        write_conf(&path, &ips).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10.0.0.1\n");
        assert_eq!(read_conf(&path).unwrap(), ips);
    }

    #[test]
    fn read_missing_conf_test() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_conf(dir.path().join("missing"));
        assert!(matches!(result, Err(Error::ConfigRead { .. })));
    }
}
