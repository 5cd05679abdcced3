use super::signature::SIGNATURE_MARKER;

/// One overload as it appears in the documentation: the raw signature line
/// and every line that follows it up to the next signature line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlock {
    pub signature: String,
    pub body: Vec<String>,
}

/// Whether a documentation line opens a new overload block.
pub fn is_signature_line(line: &str) -> bool {
    line.contains(SIGNATURE_MARKER)
}

/// Split documentation text into overload blocks in documentation order.
///
/// Lines before the first signature line belong to no block and are
/// dropped.
pub fn split_overloads(doc: Option<&str>) -> Vec<DocBlock> {
    let mut blocks: Vec<DocBlock> = Vec::new();

    for line in doc.unwrap_or_default().lines() {
        if is_signature_line(line) {
            blocks.push(DocBlock {
                signature: line.to_string(),
                body: Vec::new(),
            });
        } else if let Some(current) = blocks.last_mut() {
            current.body.push(line.to_string());
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(signature: &str, body: &[&str]) -> DocBlock {
        DocBlock {
            signature: signature.to_string(),
            body: body.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_two_overloads_with_docs() {
        let doc = "\noverload1(x: int) -> None\n\nDoes X.\n\noverload2(x: int, y: int) -> None\n\nDoes Y.\n";
        assert_eq!(
            split_overloads(Some(doc)),
            vec![
                block("overload1(x: int) -> None", &["", "Does X.", ""]),
                block("overload2(x: int, y: int) -> None", &["", "Does Y."]),
            ]
        );
    }

    #[test]
    fn test_preamble_lines_are_dropped() {
        let doc = "foo(*args, **kwargs)\nOverloaded function.\n\n1. foo(x: int) -> int\n\n2. foo(x: float) -> float\n";
        let blocks = split_overloads(Some(doc));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], block("1. foo(x: int) -> int", &[""]));
        assert_eq!(blocks[1], block("2. foo(x: float) -> float", &[]));
    }

    #[test]
    fn test_missing_or_empty_doc_has_no_blocks() {
        assert!(split_overloads(None).is_empty());
        assert!(split_overloads(Some("")).is_empty());
        assert!(split_overloads(Some("Just prose.\nNo signatures.")).is_empty());
    }

    #[test]
    fn test_body_lines_follow_nearest_signature() {
        let doc = "a(x: int) -> None\nfirst\nb(y: int) -> None\nsecond\nthird";
        let blocks = split_overloads(Some(doc));
        assert_eq!(blocks[0].body, vec!["first"]);
        assert_eq!(blocks[1].body, vec!["second", "third"]);
    }
}
