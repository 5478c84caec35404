use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write, stdin, stdout},
    path::PathBuf,
    str::FromStr,
};

/// A file path, or "-" for the standard streams.
#[derive(Clone, Debug, PartialEq)]
pub enum PathOrStd {
    /// A path on disk
    Path(PathBuf),
    /// stdin when reading, stdout when writing
    Std,
}

impl PathOrStd {
    /// Open for reading.
    pub fn reader(&self) -> anyhow::Result<Box<dyn Read>> {
        match self {
            Self::Path(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Self::Std => Ok(Box::new(stdin().lock())),
        }
    }

    /// Open (truncating) for writing.
    pub fn writer(&self) -> anyhow::Result<Box<dyn Write>> {
        match self {
            Self::Path(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
            Self::Std => Ok(Box::new(stdout().lock())),
        }
    }
}

impl FromStr for PathOrStd {
    type Err = <PathBuf as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(Self::Std)
        } else {
            Ok(Self::Path(s.parse()?))
        }
    }
}
