//! Comment block synthesis
//!
//! Output shape, each line prefixed with the indentation prefix:
//!
//! ```text
//! /**
//!  * @desc
//!  * @param {type} <param>     (one per parameter)
//!  * @returns {type}           (only with a return descriptor)
//!  */
//! ```
//!
//! Types are always the `{type}` placeholder. The function name is not printed.

use crate::position::LineEnding;
use crate::signature::SignatureRecord;

pub const TYPE_PLACEHOLDER: &str = "{type}";
pub const DESCRIPTION_LINE: &str = " * @desc ";

/// Render the comment block for `signature`, every line ending with `line_ending`
pub fn render(signature: &SignatureRecord, prefix: &str, line_ending: LineEnding) -> String {
    let eol = line_ending.as_str();
    let mut block = String::new();

    block.push_str(prefix);
    block.push_str("/**");
    block.push_str(eol);

    block.push_str(prefix);
    block.push_str(DESCRIPTION_LINE);
    block.push_str(eol);

    for param in &signature.params {
        block.push_str(&format!("{} * @param {} {}{}", prefix, TYPE_PLACEHOLDER, param, eol));
    }

    if signature.has_return() {
        block.push_str(&format!("{} * @returns {}{}", prefix, TYPE_PLACEHOLDER, eol));
    }

    block.push_str(prefix);
    block.push_str(" */");
    block.push_str(eol);

    block
}

/// Char length of the description line for `prefix`, where the cursor lands
pub fn description_line_width(prefix: &str) -> usize {
    prefix.chars().count() + DESCRIPTION_LINE.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(params: &[&str], ret: Option<&str>) -> SignatureRecord {
        SignatureRecord {
            name: None,
            params: params.iter().map(|p| p.to_string()).collect(),
            return_descriptor: ret.map(str::to_string),
        }
    }

    #[test]
    fn test_render_params_and_return() {
        let block = render(&signature(&["a", "b"], Some("x")), "", LineEnding::Lf);
        assert_eq!(
            block,
            "/**\n * @desc \n * @param {type} a\n * @param {type} b\n * @returns {type}\n */\n"
        );
    }

    #[test]
    fn test_render_without_params_or_return() {
        let block = render(&signature(&[], None), "", LineEnding::Lf);
        assert_eq!(block, "/**\n * @desc \n */\n");
        assert!(!block.contains("@param"));
        assert!(!block.contains("@returns"));
    }

    #[test]
    fn test_render_prefixes_every_line() {
        let block = render(&signature(&["value"], None), "\t  ", LineEnding::Lf);
        for line in block.lines() {
            assert!(line.starts_with("\t  "), "line {:?} should be indented", line);
        }
        assert_eq!(block.lines().count(), 4);
    }

    #[test]
    fn test_render_crlf() {
        let block = render(&signature(&["a"], None), "", LineEnding::Crlf);
        assert_eq!(block, "/**\r\n * @desc \r\n * @param {type} a\r\n */\r\n");
    }

    #[test]
    fn test_render_ignores_name() {
        let mut named = signature(&["a"], None);
        named.name = Some("add".into());
        assert_eq!(
            render(&named, "", LineEnding::Lf),
            render(&signature(&["a"], None), "", LineEnding::Lf)
        );
    }

    #[test]
    fn test_description_line_width() {
        assert_eq!(description_line_width(""), 9);
        assert_eq!(description_line_width("    "), 13);
        assert_eq!(description_line_width("\t"), 10);
    }
}
