#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Small dataset using the default axis column names.
pub const COST_CSV: &str = "\
Desal 1 base cost,Disposal cost,LCOW,Total cost
0.5,1,1.10,100
0.75,1,1.20,110
0.5,2,1.30,120
0.75,2,1.40,130
0.5,9,9.99,999
";

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

pub fn write_gzip_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}
