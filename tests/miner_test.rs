//! Integration tests for source fact mining.

use std::io::Write;

use tex2qmd::{mine_source, read_source, MinerOptions, SourceEncoding, SourceMiner};

const CHAPTER: &str = r"\chapter{La fiscalité indirecte}

%% Relecture : mars 2014
% Chiffres à mettre à jour
La TVA est le premier impôt en recettes.

\begin{tab}[htbp]{Évolution des taux de TVA\label{table:historique tva}}
\begin{tabular}{ccc}
Année & Normal & Réduit \\
\end{tabular}
\end{tab}

\begin{figure}
\caption{Recettes de l'accise \textbf{sur les tabacs}\label{fig:recettes}}
\end{figure}

Le taux réduit est de 5,5\% depuis 2012.
% fin
";

#[test]
fn test_comments_in_source_order() {
    let facts = mine_source(CHAPTER);
    assert_eq!(facts.comments.len(), 2);

    assert_eq!(facts.comments[0].text, "Relecture : mars 2014\nChiffres à mettre à jour");
    assert_eq!(facts.comments[0].anchor, "La TVA est le premier impôt en recettes.");

    assert_eq!(facts.comments[1].text, "fin");
    assert!(!facts.comments[1].is_anchored());
}

#[test]
fn test_captions() {
    let facts = mine_source(CHAPTER);
    assert_eq!(facts.captions.len(), 2);
    assert_eq!(
        facts.captions.get("table:historique tva"),
        Some("Évolution des taux de TVA")
    );
    assert_eq!(
        facts.captions.get("fig:recettes"),
        Some(r"Recettes de l'accise \textbf{sur les tabacs}")
    );
}

#[test]
fn test_custom_options() {
    let options = MinerOptions::new()
        .with_comment_marker('#')
        .with_anchor_len(10)
        .with_caption_command("legende")
        .with_title_environments(Vec::<String>::new());
    let miner = SourceMiner::with_options(options).unwrap();

    let facts = miner.mine("# note\nUne ligne assez longue.\n\\legende{Titre\\label{t}}\n");
    assert_eq!(facts.comments[0].anchor, "Une ligne");
    assert_eq!(facts.captions.get("t"), Some("Titre"));
    assert!(miner.mine(CHAPTER).captions.is_empty());
}

#[test]
fn test_empty_source() {
    let facts = mine_source("");
    assert!(facts.is_empty());
}

#[test]
fn test_latin1_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"% R\xE9sum\xE9\nL'imp\xF4t sur le revenu.\n").unwrap();

    let source = read_source(file.path()).unwrap();
    assert_eq!(source.encoding, SourceEncoding::Latin1);

    let facts = SourceMiner::new().mine(&source.text);
    assert_eq!(facts.comments[0].text, "Résumé");
    assert_eq!(facts.comments[0].anchor, "L'impôt sur le revenu.");
}

#[test]
fn test_bom_and_crlf_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\xEF\xBB\xBF% note\r\nTexte.\r\n").unwrap();

    let source = read_source(file.path()).unwrap();
    assert_eq!(source.encoding, SourceEncoding::Utf8Bom);
    assert_eq!(source.text, "% note\nTexte.\n");
}

#[test]
fn test_decomposed_accents_normalized() {
    // "é" as e + combining acute accent
    let facts = mine_source("% n\nCre\u{301}dit d'impo\u{302}t\n");
    assert_eq!(facts.comments[0].anchor, "Crédit d'impôt");
}

#[test]
fn test_facts_serialize() {
    let facts = mine_source("% a\nb\n");
    let json = serde_json::to_value(&facts).unwrap();
    assert_eq!(json["comments"][0]["text"], "a");
    assert_eq!(json["comments"][0]["anchor"], "b");
}
