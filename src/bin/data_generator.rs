use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() {
    let path = "data/atlas_1m.tsv";
    std::fs::create_dir_all("data").unwrap();
    let file = File::create(path).unwrap();
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "Gene ID\tGene Name\ttissue_a\ttissue_b\ttissue_c\ttissue_d"
    )
    .unwrap();

    let mut rng = rand::rng();
    for i in 0..1_000_000 {
        write!(writer, "G{:07}\tgene_{}", i, i).unwrap();
        for _ in 0..4 {
            if rng.random_range(0..50) == 0 {
                // empty cell, ingested as a null
                write!(writer, "\t").unwrap();
            } else {
                write!(writer, "\t{:.3}", rng.random_range(0.0..1000.0)).unwrap();
            }
        }
        writeln!(writer).unwrap();
    }

    println!("Sample TSV generated: {}", path);
}
