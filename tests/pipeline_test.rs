//! Integration tests for the repair pipeline.

use serde_json::json;
use tex2qmd::pipeline::{CorrectionRule, HeadingOptions};
use tex2qmd::{
    repair, repair_with_options, LegislationEntry, Pipeline, PipelineOptions, SourceMiner,
    TableReplacement,
};

const SOURCE: &str = r"\section{Les droits d'accise}

Voir le tableau \ref{table:tabac}.

\begin{tab}[htbp]{Les droits sur les tabacs\label{table:tabac}}
\begin{tabular}{|c|c|}
Produit & Droit \\
Cigarettes & 304 € \\
\end{tabular}
\end{tab}

\section{Historique}

\section{Perspectives}

% Chiffres provisoires
Les recettes progressent.

La loi du 15 juillet 1914 a créé l'impôt\footnote{Note.}.
";

const DRAFT: &str = r#"# Les droits d'accise

Voir le tableau [1](#table:tabac){reference-type="ref" reference="table:tabac"}.

Les droits sur les tabacs []{#table:tabac label="table:tabac"}

::: tabular
Produit & Droit \\
Cigarettes & 304 € \\
:::

# Historique

# Perspectives

Les recettes progressent.

La loi du 15 juillet 1914 a créé l'impôt[^1].

[^1]: Note.
"#;

fn legislation() -> Vec<LegislationEntry> {
    vec![LegislationEntry::new(
        "loi1914",
        ["loi du 15 juillet 1914"],
        "Loi du 15 juillet 1914",
        "1914-07-15",
    )]
}

fn full_options() -> PipelineOptions {
    PipelineOptions::default()
        .with_title("Les droits d'accise")
        .with_footnote_prefix("accise")
        .with_legislation(legislation())
}

#[test]
fn test_full_chapter() {
    let result = repair_with_options(SOURCE, DRAFT, full_options()).unwrap();
    let out = &result.content;

    assert!(out.starts_with("---\ntitle: \"Les droits d'accise\"\n---\n\n## Les droits d'accise\n"));
    assert!(out.contains(
        r#"Voir le tableau [Les droits sur les tabacs](#table:tabac){reference-type="ref" reference="table:tabac"}."#
    ));
    assert!(out.contains("Les droits sur les tabacs []{#table:tabac}\n"));
    assert!(out.contains("| Produit | Droit |\n|---|---|\n| Cigarettes | 304 € |\n"));
    assert!(out.contains("## Historique\n\n*[À rédiger.]*\n"));
    assert!(out.contains("<!-- Chiffres provisoires -->\nLes recettes progressent."));
    assert!(out.contains(
        "La loi du 15 juillet 1914 [@loi1914] a créé l'impôt [^accise-1]."
    ));
    assert!(out.contains("[^accise-1]: Note."));
    assert!(!out.contains("::: tabular"));
}

#[test]
fn test_full_chapter_stats() {
    let stats = repair_with_options(SOURCE, DRAFT, full_options())
        .unwrap()
        .stats;

    assert_eq!(stats.references_rewritten, 1);
    assert_eq!(stats.references_unresolved, 0);
    assert_eq!(stats.comments_anchored, 1);
    assert_eq!(stats.comments_appended, 0);
    assert_eq!(stats.attribute_blocks_simplified, 1);
    assert_eq!(stats.headings_shifted, 3);
    assert_eq!(stats.placeholders_inserted, 1);
    assert_eq!(stats.tables_repaired, 1);
    assert_eq!(stats.footnotes_prefixed, 2);
    assert_eq!(stats.citations_linked, 1);
}

#[test]
fn test_crlf_draft_matches_lf_source() {
    let source = "% Note de bas de page\r\nLe taux normal est de 20 %.\r\n";
    let draft = "Le taux normal est de 20 %.\r\n";
    let result = repair(source, draft).unwrap();
    assert_eq!(
        result.content,
        "<!-- Note de bas de page -->\nLe taux normal est de 20 %.\n"
    );
}

#[test]
fn test_unanchored_comments_appended() {
    let source = "% Premier\nTexte absent du brouillon.\n% Fin du chapitre\n";
    let draft = "# Titre\n\nAutre texte.\n";
    let result = repair_with_options(source, draft, PipelineOptions::minimal()).unwrap();
    assert_eq!(
        result.content,
        "# Titre\n\nAutre texte.\n<!-- Fin du chapitre -->\n<!-- Premier -->\n"
    );
    assert_eq!(result.stats.comments_appended, 2);
}

#[test]
fn test_nothing_to_repair() {
    let draft = "# Titre\n\nUn paragraphe.\n";
    let result = repair_with_options("", draft, PipelineOptions::minimal()).unwrap();
    assert_eq!(result.content, draft);
    assert_eq!(result.stats, Default::default());
}

#[test]
fn test_table_replacement() {
    let draft = "Texte\n\n::: tab\nÉvolution []{#table:historique-taux-tva}\n\n| x |\n:::\n";
    let replacement = TableReplacement::new(
        "table:historique-taux-tva",
        json!({"header": ["Année", "Taux normal"], "rows": [["1968", "20 %"], ["2014", "20 %"]]}),
    )
    .with_caption("Évolution des taux de TVA");
    let options = PipelineOptions::minimal().with_table_replacement(replacement);

    let result = repair_with_options("", draft, options).unwrap();
    assert_eq!(
        result.content,
        "Texte\n\n| Année | Taux normal |\n|---|---|\n| 1968 | 20 % |\n| 2014 | 20 % |\n\n\
         : Évolution des taux de TVA {#table:historique-taux-tva}\n"
    );
    assert_eq!(result.stats.tables_replaced, 1);
}

#[test]
fn test_custom_heading_options() {
    let options = PipelineOptions::default().with_headings(HeadingOptions {
        shift: 2,
        max_depth: 4,
        placeholder: "TODO".to_string(),
    });
    let result = repair_with_options("", "# A\n\n### B\n", options).unwrap();
    assert_eq!(result.content, "### A\n\nTODO\n\n\n#### B\n\nTODO\n\n");
}

#[test]
fn test_custom_correction_rules() {
    let options = PipelineOptions::minimal()
        .with_correction_rules(vec![CorrectionRule::new(r"\bCSG\b", "contribution sociale")]);
    let result = repair_with_options("", "La CSG finance.\n", options).unwrap();
    assert_eq!(result.content, "La contribution sociale finance.\n");
}

#[test]
fn test_pipeline_reused_across_documents() {
    let miner = SourceMiner::new();
    let pipeline = Pipeline::new(PipelineOptions::minimal()).unwrap();

    let first = pipeline.run("Premier.\n", &miner.mine("% a\nPremier.\n"));
    let second = pipeline.run("Second.\n", &miner.mine("% b\nSecond.\n"));

    assert_eq!(first.content, "<!-- a -->\nPremier.\n");
    assert_eq!(second.content, "<!-- b -->\nSecond.\n");
}
