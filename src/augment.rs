//! Guarantees a minimum editorial floor before a body is rendered: every post
//! mentions at least one topical keyword and carries a call to action that
//! ends in a conclusion line.

use crate::plain::CONCLUSION_MARKER;

/// A body that mentions none of these (case-insensitively) gets
/// [`TOPIC_SECTION`] appended.
pub const TOPIC_KEYWORDS: &[&str] = &[
    "riesgo",
    "seguridad",
    "evaluación",
    "exposición",
    "vulnerabilidad",
];

/// A body that doesn't contain this text (case-insensitively) gets
/// [`CTA_SECTION`] appended.
pub const CTA_MARKER: &str = "Solicitar evaluación";

pub const TOPIC_SECTION: &str = "## Por qué importa evaluar el riesgo\n\
Una vivienda o un negocio no es más seguro por acumular sistemas. \
Lo es cuando se conoce su exposición real: accesos, rutinas, tiempos de reacción \
y puntos que un intruso observa antes de actuar.";

pub const CTA_SECTION: &str = "## Siguiente paso\n\
**Solicitar evaluación** profesional permite priorizar medidas con datos, \
no con percepciones.";

/// Appends the fixed sections `body` is missing. Returns the body unchanged
/// when it already covers both.
pub fn augment(body: &str) -> String {
    let lowered = body.to_lowercase();
    let mut out = body.trim_end().to_owned();

    if !TOPIC_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        push_section(&mut out, TOPIC_SECTION);
    }
    if !lowered.contains(&CTA_MARKER.to_lowercase()) {
        push_section(&mut out, CTA_SECTION);
        out.push_str("\n\n");
        out.push_str(CONCLUSION_MARKER);
        out.push_str(" Evaluar el riesgo con método aporta claridad para decidir.");
    }

    match out.len() == body.trim_end().len() {
        true => body.to_owned(),
        false => {
            out.push('\n');
            out
        }
    }
}

fn push_section(out: &mut String, section: &str) {
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(section);
}
