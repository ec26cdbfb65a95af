use std::fs;
use std::path::Path;

use crate::domain::{CardFragment, CountryRecord};
use crate::error::FlashError;

const DEFAULT_PREAMBLE: &str = r"
\documentclass[frontgrid, backgrid,a4,12pt]{flacards}
\usepackage{color}
\usepackage{graphicx}
\usepackage{etoolbox}
\pretocmd{\card}{\def\curhint{}}{}{}

\pagesetup{2}{4}

% Chinese support
\usepackage{xeCJK}

\renewcommand{\cardtextstylef}{\Huge}
\renewcommand{\cardtextstyleb}{\small}
\renewcommand{\brfoot}{}
\renewcommand{\bcfoot}{\let\\\relax\footnotesize\curhint}
\renewcommand{\flhead}{\footnotesize\thecardno}
\renewcommand{\brhead}{\footnotesize\thecardno}

\usepackage{array}
\usepackage{multirow}
\usepackage{ragged2e}

\newcommand{\inputfield}{\rule[-1mm]{3cm}{0.5pt}}
\begin{document}
";

const DEFAULT_POSTAMBLE: &str = r"
\end{document}";

/// Escapes the LaTeX control characters `% & # $ _ { }`.
///
/// Backslashes are left alone, so an escape is never escaped twice.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '&' | '#' | '$' | '_' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Renders the two-faced card for one record. `image_path` is written into
/// `\includegraphics` as is, whether or not the file was downloaded.
pub fn render_card(record: &CountryRecord, image_path: &str) -> CardFragment {
    let name = escape(&record.name);
    let name_cn = escape(&record.name_cn);
    let capital = escape(&record.capital);
    let capital_cn = escape(&record.capital_cn);
    let languages = escape(&record.languages_joined());
    let languages_cn = escape(&record.languages_cn);
    let fact = escape(&record.fact);

    CardFragment::new(format!(
        r"\card{{\centering\includegraphics[width=0.3\textwidth]{{{image_path}}}}}{{
\begin{{tabular}}{{m{{3cm}} m{{5cm}}}} \textbf{{{name}}} & \textbf{{{name_cn}}} \\[0.5em] \multicolumn{{1}}{{m{{3cm}}}}{{\raggedright {capital}\\{capital_cn}\\{languages}\\{languages_cn}}} &
\raggedright \textbf{{Fact:}} {fact}
\end{{tabular}}
}}"
    ))
}

/// Fixed text wrapped around the cards of a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    pub preamble: String,
    pub postamble: String,
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
            postamble: DEFAULT_POSTAMBLE.to_string(),
        }
    }
}

impl DocumentTemplate {
    /// Default template with either part replaced by the content of a file.
    pub fn with_overrides(
        preamble_path: Option<&Path>,
        postamble_path: Option<&Path>,
    ) -> Result<Self, FlashError> {
        let mut template = Self::default();
        if let Some(path) = preamble_path {
            template.preamble = read_template(path)?;
        }
        if let Some(path) = postamble_path {
            template.postamble = read_template(path)?;
        }
        Ok(template)
    }

    pub fn assemble(&self, fragments: &[CardFragment]) -> String {
        let body = fragments
            .iter()
            .map(CardFragment::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        let mut document =
            String::with_capacity(self.preamble.len() + body.len() + self.postamble.len());
        document.push_str(&self.preamble);
        document.push_str(&body);
        document.push_str(&self.postamble);
        document
    }
}

fn read_template(path: &Path) -> Result<String, FlashError> {
    fs::read_to_string(path).map_err(|_| FlashError::TemplateRead(path.to_path_buf()))
}
