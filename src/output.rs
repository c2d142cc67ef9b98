use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use super::error::Result;
use super::sweep::Sample;

/// スイープ結果を`X,Y,Z`のヘッダ付きのCSVとして書き出す。
/// 当たらなかったサンプルは空の行`,,`になるので、行数は常にサンプル数と一致する。
pub fn write_table<W: Write>(mut writer: W, samples: &[Sample]) -> Result<()> {
    writeln!(writer, "X,Y,Z")?;
    for sample in samples {
        match &sample.point {
            Some(p) => writeln!(writer, "{},{},{}", p.x, p.y, p.z)?,
            None => writeln!(writer, ",,")?,
        }
    }
    writer.flush()?;
    Ok(())
}

/// CSVファイルに保存する。
pub fn save_table<P: AsRef<Path>>(path: P, samples: &[Sample]) -> Result<()> {
    let path = path.as_ref();
    write_table(BufWriter::new(File::create(path)?), samples)?;
    info!("CSV file has been created: {}", path.display());
    Ok(())
}
