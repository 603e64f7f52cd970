use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

use neopairs::config::PipelineConfigBuilder;
use neopairs::errors::PipelineResult;
use neopairs::pair::{read_pairs, PAIR_HEADER};
use neopairs::pipeline;

const PRIMARY: &str = "\
>ENSP00000256078.5 pep gene:ENSG00000133703.13 transcript:ENST00000256078.10 gene_symbol:KRAS
MTEYKLVVVGAGGVGKSALTIQLIQNHFVDEYDPTIEDSYRKQVVIDGETCLLDILDTAG
>ENSP00000311936.3 pep gene:ENSG00000133703.13 transcript:ENST00000311936.8 gene_symbol:KRAS
MTEYKLVVVGAVGVGKSALTIQLIQNHFVDEYDPTIEDSYRKQVVIDGETCLLDILDTAG
";

// Only ENST00000900001 is new, the other record collides with the primary one
const SECONDARY: &str = "\
>ENSP00000900001.1 pep gene:ENSG00000999999.1 transcript:ENST00000900001.1
MKWVTFISLLFLFSSAYS
>ENSP00000256078.5 pep gene:ENSG00000133703.13 transcript:ENST00000256078.10 gene_symbol:KRAS
MAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA
";

const SYMBOLS: &str = "\
Hugo_Symbol\tGene_ID
ALB\tENSG00000999999.1
";

const MUTATIONS: &str = "\
Tumor_Sample_Barcode\tHugo_Symbol\tTranscript_ID\tHGVSp_Short\tCell_Fraction
TCGA-02\tKRAS\t\tp.V12C\t0.9
TCGA-01\tKRAS\tENST00000256078.10\tp.G12D\t1.0
TCGA-01\tALB\t\tp.W3R\t1.0
TCGA-01\tKRAS\tENST00000256078\tp.G60R\t1.0
TCGA-03\tKRAS\t\tp.G12D\t1.0
TCGA-03\tKRAS\t\tp.G12V\t1.0
TCGA-04\tMISSING\t\tp.A2T\t1.0
TCGA-05\tKRAS\tENST00000256078\tp.G12D\tnot-a-number
";

fn write_gz(path: &Path, content: &str) {
    let mut writer =
        niffler::to_path(path, niffler::compression::Format::Gzip, niffler::Level::Six).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
}

#[test]
fn test_end_to_end_generation() -> PipelineResult<()> {
    let dir = TempDir::new()?;
    let primary = dir.path().join("primary.fa.gz");
    let secondary = dir.path().join("secondary.fa");
    let symbols = dir.path().join("symbols.tsv");
    let mutations = dir.path().join("mutations.maf");
    let output = dir.path().join("pairs.tsv");

    write_gz(&primary, PRIMARY);
    fs::write(&secondary, SECONDARY)?;
    fs::write(&symbols, SYMBOLS)?;
    fs::write(&mutations, MUTATIONS)?;

    let config = PipelineConfigBuilder::new(primary, mutations)?
        .secondary_proteome(secondary)
        .symbol_map(symbols)
        .peptide_lengths(&[9])?
        .output(output.clone())
        .build()?;
    let metrics = pipeline::run(&config)?;

    let text = fs::read_to_string(&output)?;
    assert!(text.starts_with(PAIR_HEADER));
    let records = read_pairs(text.as_bytes())?;

    // TCGA-01/ALB: W3R through the symbol map into the secondary proteome, 3 windows
    // TCGA-01/KRAS: G12D plus G60R by transcript; G60 is the last residue
    //   and only gets the window ending there
    // TCGA-02/KRAS: V12C only matches the second isoform
    // TCGA-03: G12D vs G12V at equal fraction is ambiguous
    // TCGA-04: unknown gene
    let keys: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.tumor.as_str(), r.gene.as_str()))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    assert_eq!(keys, vec![("TCGA-01", "ALB"), ("TCGA-01", "KRAS"), ("TCGA-02", "KRAS")]);

    let alb: Vec<_> = records.iter().filter(|r| r.gene == "ALB").collect();
    assert_eq!(alb.len(), 3);
    assert_eq!(alb[0].self_peptide, "MKWVTFISL");
    assert_eq!(alb[0].neo_peptide, "MKRVTFISL");

    let kras: Vec<_> =
        records.iter().filter(|r| r.tumor == "TCGA-01" && r.gene == "KRAS").collect();
    // union over both mutations, nine windows for G12D and one for G60R
    assert_eq!(kras.len(), 10);
    assert_eq!(kras[0].self_peptide, "YKLVVVGAG");
    assert_eq!(kras[0].neo_peptide, "YKLVVVGAD");
    let last = kras[kras.len() - 1];
    assert_eq!((last.range.lower, last.range.upper), (52, 60));
    assert_eq!(last.self_peptide, "LLDILDTAG");
    assert_eq!(last.neo_peptide, "LLDILDTAR");

    let tcga02: Vec<_> = records.iter().filter(|r| r.tumor == "TCGA-02").collect();
    assert_eq!(tcga02.len(), 9);
    assert!(tcga02.iter().any(|r| r.self_peptide.contains("GAVGV")));

    for pair in records.windows(2) {
        let a = (&pair[0].tumor, &pair[0].gene, pair[0].range);
        let b = (&pair[1].tumor, &pair[1].gene, pair[1].range);
        assert!(a < b, "records out of order: {:?} then {:?}", a, b);
    }

    assert_eq!(metrics.groups_processed, 5);
    assert_eq!(metrics.groups_succeeded, 3);
    assert_eq!(metrics.skipped_by_reason.get("AmbiguousMutation"), Some(&1));
    assert_eq!(metrics.skipped_by_reason.get("UnmappedGene"), Some(&1));
    assert_eq!(metrics.records_emitted as usize, records.len());

    Ok(())
}

#[test]
fn test_duplicate_primary_ids_are_fatal() -> PipelineResult<()> {
    let dir = TempDir::new()?;
    let primary = dir.path().join("primary.fa");
    let mutations = dir.path().join("mutations.maf");
    fs::write(&primary, format!("{}{}", PRIMARY, PRIMARY))?;
    fs::write(&mutations, MUTATIONS)?;

    let config = PipelineConfigBuilder::new(primary, mutations)?.build()?;
    let err = pipeline::run(&config).unwrap_err();
    assert_eq!(err.kind(), "DuplicateIdentifier");

    Ok(())
}
