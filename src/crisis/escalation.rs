use serde::{Deserialize, Serialize};

/// Tag prefixed to the synthesized assistant turn stored for a crisis reply.
pub const CRISIS_TAG: &str = "[CRISIS PROTOCOL ACTIVATED]";

const VALIDATION: &str = "Ďakujem, že ste mi to povedali. Je to veľmi vážne a je dôležité, aby ste sa porozprávali s niekým, kto vám môže pomôcť práve teraz.";
const RESOURCES_TITLE: &str = "Tu sú kontakty na linky pomoci. Sú bezplatné, anonymné a dostupné nonstop:";
const RESOURCES_LIST: &str = "• **Ak ste v bezprostrednom ohrození, volajte 112**\n• **Linka dôvery Nezábudka (SK):** 0800 800 566\n• **Krízová linka pomoci (IPčko):** www.krizovalinkapomoci.sk (chat)\n• **Linka bezpečí (CZ):** 116 111";
const ENCOURAGEMENT: &str = "Prosím, zvážte zavolanie alebo napísanie na jednu z týchto liniek. Sú tam ľudia, ktorí sú školení na to, aby vám pomohli.";
const SAFETY_CHECK: &str = "Som tu s vami. Ste práve teraz v bezpečí?";

/// Kind of a reply segment. The first five form the crisis sequence;
/// `Standard` and `Fallback` mark the normal and degraded reply paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Validation,
    ResourcesTitle,
    ResourcesList,
    Encouragement,
    SafetyCheck,
    Standard,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSegment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub content: String,
}

impl ResponseSegment {
    pub fn new(kind: SegmentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn standard(content: impl Into<String>) -> Self {
        Self::new(SegmentKind::Standard, content)
    }

    pub fn fallback(content: impl Into<String>) -> Self {
        Self::new(SegmentKind::Fallback, content)
    }
}

/// The fixed escalation sequence. Content and order are safety-critical:
/// no branching, no randomness, no I/O, and no dependency on the completion
/// backend, so it works even when the model is down.
pub fn crisis_response_sequence() -> Vec<ResponseSegment> {
    vec![
        ResponseSegment::new(SegmentKind::Validation, VALIDATION),
        ResponseSegment::new(SegmentKind::ResourcesTitle, RESOURCES_TITLE),
        ResponseSegment::new(SegmentKind::ResourcesList, RESOURCES_LIST),
        ResponseSegment::new(SegmentKind::Encouragement, ENCOURAGEMENT),
        ResponseSegment::new(SegmentKind::SafetyCheck, SAFETY_CHECK),
    ]
}

/// Escalation text as stored in the session history (one assistant turn).
pub fn concatenated_crisis_text() -> String {
    crisis_response_sequence()
        .iter()
        .map(|segment| segment.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{SegmentKind, concatenated_crisis_text, crisis_response_sequence};

    #[test]
    fn sequence_has_five_segments_in_fixed_order() {
        let sequence = crisis_response_sequence();
        let kinds: Vec<SegmentKind> = sequence.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Validation,
                SegmentKind::ResourcesTitle,
                SegmentKind::ResourcesList,
                SegmentKind::Encouragement,
                SegmentKind::SafetyCheck,
            ]
        );
        assert!(sequence.iter().all(|s| !s.content.is_empty()));
    }

    #[test]
    fn sequence_is_constant_across_invocations() {
        assert_eq!(crisis_response_sequence(), crisis_response_sequence());
    }

    #[test]
    fn resources_include_emergency_number_and_crisis_lines() {
        let list = &crisis_response_sequence()[2].content;
        assert!(list.contains("112"));
        assert!(list.contains("0800 800 566"));
        assert!(list.contains("116 111"));
    }

    #[test]
    fn segment_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SegmentKind::ResourcesTitle).unwrap();
        assert_eq!(json, "\"resources_title\"");
        let json = serde_json::to_string(&SegmentKind::SafetyCheck).unwrap();
        assert_eq!(json, "\"safety_check\"");
    }

    #[test]
    fn concatenated_text_joins_all_segments() {
        let text = concatenated_crisis_text();
        for segment in crisis_response_sequence() {
            assert!(text.contains(&segment.content));
        }
    }
}
