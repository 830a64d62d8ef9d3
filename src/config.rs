use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_file: PathBuf,
    /// Non-tabular lines at the top of the export, before the header row.
    pub preamble_lines: usize,
    pub target_modalities: Vec<String>,
    pub columns: ColumnNames,
    pub keywords: ColumnKeywords,
}

/// Columns whose names are stable across releases of the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub status: String,
    pub modality: String,
    pub seats_offered: String,
    pub aa_seats_offered: String,
    pub seats_filled: String,
    pub applicants: String,
    pub aa_applicants: String,
}

/// Keyword fragments for columns whose names drift between releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnKeywords {
    pub aa_quota_filled: Vec<String>,
    pub aa_open_filled: Vec<String>,
    pub adoption_pre: Vec<String>,
    pub adoption_interim: Vec<String>,
    pub adoption_resolution: Vec<String>,
    pub groups_pre: Vec<String>,
    pub groups_interim: Vec<String>,
    pub groups_all: Vec<String>,
    pub groups_resolution: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("dados_ufma.csv"),
            preamble_lines: 8,
            target_modalities: strings(&[
                "Mestrado",
                "Doutorado",
                "Mestrado/Doutorado",
                "Mestrado / Doutorado",
            ]),
            columns: ColumnNames::default(),
            keywords: ColumnKeywords::default(),
        }
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            status: "Situação".to_string(),
            modality: "Modalidade".to_string(),
            seats_offered: "Total de Vagas Oferecidas".to_string(),
            aa_seats_offered: "Total de Vagas AA Oferecidas".to_string(),
            seats_filled: "Vagas totais preenchidas".to_string(),
            applicants: "Inscritos totais".to_string(),
            aa_applicants: "Inscritos AA".to_string(),
        }
    }
}

impl Default for ColumnKeywords {
    fn default() -> Self {
        Self {
            aa_quota_filled: strings(&["preenchidas AA", "vagas AA preenchidas"]),
            aa_open_filled: strings(&["aprovados na AC", "aprovados AC"]),
            adoption_pre: strings(&["antes da IN"]),
            adoption_interim: strings(&["depois da criação da IN", "após a IN"]),
            adoption_resolution: strings(&["depois da criação da Resolução", "após a Resolução"]),
            groups_pre: strings(&["grupos contemplados antes", "grupos antes da"]),
            groups_interim: strings(&[
                "grupos incluídos após a IN",
                "grupos incluídos depois da criação da IN",
            ]),
            groups_all: strings(&["todos os grupos"]),
            groups_resolution: strings(&[
                "grupos incluídos após a Resolução",
                "grupos incluídos depois da criação da Resolução",
            ]),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
