#![allow(dead_code)]

pub const HEADER: &str = "#assembly_accession\tbioproject\tbiosample\twgs_master\trefseq_category\ttaxid\tspecies_taxid\torganism_name\tinfraspecific_name\tisolate\tversion_status\tassembly_level\trelease_type\tgenome_rep\tseq_rel_date\tasm_name\tasm_submitter\tgbrs_paired_asm\tpaired_asm_comp\tftp_path\texcluded_from_refseq\trelation_to_type_material\tasm_not_live_date\tassembly_type\tgroup\tgenome_size\tgenome_size_ungapped\tgc_percent\treplicon_count\tscaffold_count\tcontig_count\tannotation_provider\tannotation_name\tannotation_date\ttotal_gene_count\tprotein_coding_gene_count\tnon_coding_gene_count\tpubmed_id";

/// One assembly_summary.txt row with the five consumed columns filled in.
pub fn summary_line(accession: &str, taxid: &str, name: &str, size: &str, gc: &str, cds: &str) -> String {
    let mut fields = vec!["na"; 38];
    fields[0] = accession;
    fields[5] = taxid;
    fields[6] = taxid;
    fields[7] = name;
    fields[11] = "Complete Genome";
    fields[25] = size;
    fields[27] = gc;
    fields[35] = cds;
    fields.join("\t")
}

pub fn feed(lines: &[String]) -> String {
    let mut text = String::from("#   See ftp://ftp.ncbi.nlm.nih.gov/genomes/README_assembly_summary.txt for a description of the columns in this file.\n");
    text.push_str(HEADER);
    text.push('\n');
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

pub fn sample_lines() -> Vec<String> {
    vec![
        summary_line("GCF_000005845.2", "511145", "Escherichia coli str. K-12 substr. MG1655", "4641652", "50.50", "4285"),
        summary_line("GCF_000008865.2", "511145", "Escherichia coli str. K-12 substr. MG1655", "4641700", "50.80", "4300"),
        summary_line("GCF_000009045.1", "224308", "Bacillus subtilis subsp. subtilis str. 168", "4215606", "43.50", "4237"),
        summary_line("GCF_000195955.2", "83332", "Mycobacterium tuberculosis H37Rv", "4411532", "65.50", "3906"),
        summary_line("GCF_000195955.3", "83332", "Mycobacterium tuberculosis H37Rv", "4411600", "65.60", "na"),
        summary_line("GCF_000195955.4", "83332", "Mycobacterium tuberculosis H37Rv", "na", "65.70", "3950"),
        summary_line("GCF_000195955.5", "83332", "Mycobacterium tuberculosis H37Rv", "4411650", "165.0", "3960"),
        summary_line("GCF_000195955.6", "83332", "Mycobacterium tuberculosis H37Rv", "4411700", "65.40", "3970"),
        summary_line("GCF_000195955.7", "83332", "Mycobacterium tuberculosis H37Rv", "9900000", "65.50", "3980"),
        summary_line("GCF_999999999.1", "na", "Unclassified bacterium", "1000000", "40.0", "900"),
    ]
}
