//! Rendering of descriptors into stub declaration text.
//!
//! Every function takes the indentation (in spaces) of the declaration it
//! renders and returns complete lines. Blank lines never carry indentation.

use super::model::{
    Callable, ClassDescriptor, Declaration, EnumeratorDescriptor, FunctionDescriptor,
    PropertyDescriptor, ScriptedFunctionDescriptor,
};

const INDENT_STEP: usize = 4;
const DOC_QUOTES: &str = "\"\"\"";

fn push_line(output: &mut String, indent: usize, line: &str) {
    if !line.is_empty() {
        output.push_str(&" ".repeat(indent));
        output.push_str(line);
    }
    output.push('\n');
}

fn push_doc_block<'a>(output: &mut String, indent: usize, lines: impl IntoIterator<Item = &'a str>) {
    push_line(output, indent, DOC_QUOTES);
    for line in lines {
        push_line(output, indent, line);
    }
    push_line(output, indent, DOC_QUOTES);
}

/// Render every overload of a compiled function, the first plain and the rest
/// marked with `@overload`.
pub fn render_function(function: &FunctionDescriptor, indent: usize) -> String {
    let mut output = String::new();

    for (position, overload) in function.overloads().iter().enumerate() {
        let has_doc = overload.has_doc();

        if position > 0 {
            push_line(&mut output, indent, "@overload");
        }
        push_line(
            &mut output,
            indent,
            &format!(
                "def {}:{}",
                overload.signature.line,
                if has_doc { "" } else { " ..." }
            ),
        );

        if has_doc {
            let inner = indent + INDENT_STEP;
            push_doc_block(&mut output, inner, overload.body[1..].iter().map(String::as_str));
            push_line(&mut output, inner, "...");
            push_line(&mut output, 0, "");
        }
    }

    output
}

pub fn render_scripted(function: &ScriptedFunctionDescriptor, indent: usize) -> String {
    let mut output = String::new();
    let doc = function.doc.as_deref().filter(|d| !d.is_empty());

    push_line(
        &mut output,
        indent,
        &format!(
            "def {}{}:{}",
            function.name,
            function.signature,
            if doc.is_some() { "" } else { " ..." }
        ),
    );

    if let Some(doc) = doc {
        let inner = indent + INDENT_STEP;
        push_doc_block(&mut output, inner, doc.lines().map(str::trim));
        push_line(&mut output, inner, "...");
        push_line(&mut output, 0, "");
    }

    output
}

/// `name = ...` followed by the property documentation: a one-line string
/// when it fits on one line without quotes, a block otherwise.
pub fn render_property(property: &PropertyDescriptor, indent: usize) -> String {
    let mut output = String::new();
    push_line(&mut output, indent, &format!("{} = ...", property.name));

    if let Some(doc) = property.doc.as_deref() {
        let lines: Vec<&str> = doc.lines().collect();
        match lines.as_slice() {
            [] => {}
            [single] if !single.contains('"') => {
                push_line(&mut output, indent, &format!("\"{}\"", single));
            }
            _ => push_doc_block(&mut output, indent, lines),
        }
    }

    output
}

pub fn render_enumerator(enumerator: &EnumeratorDescriptor, indent: usize) -> String {
    let mut output = String::new();
    let value = enumerator
        .value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "...".to_string());
    push_line(&mut output, indent, &format!("{} = {}", enumerator.name, value));

    if !enumerator.doc.is_empty() {
        push_doc_block(&mut output, indent, enumerator.doc.iter().map(String::as_str));
    }

    output
}

pub fn render_data(name: &str, indent: usize) -> String {
    format!("{}{} = ...\n", " ".repeat(indent), name)
}

/// Reference to a submodule, which gets its own stub unit.
pub fn render_submodule(name: &str) -> String {
    format!("\nfrom . import {0} as {0}\n\n", name)
}

pub fn render_class(class: &ClassDescriptor, indent: usize) -> String {
    let inner = indent + INDENT_STEP;
    let mut body = String::new();

    if let Some(doc) = class.doc.as_deref() {
        let mut lines: Vec<&str> = doc.lines().collect();
        if lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
        }
        if !lines.is_empty() {
            push_doc_block(&mut body, inner, lines);
            push_line(&mut body, 0, "");
        }
    }

    for special in [&class.init, &class.call].into_iter().flatten() {
        body.push_str(&render_function(special, inner));
    }

    if !class.properties.is_empty() {
        for property in &class.properties {
            body.push_str(&render_property(property, inner));
        }
        push_line(&mut body, 0, "");
    }

    if !class.enumerators.is_empty() {
        for enumerator in &class.enumerators {
            body.push_str(&render_enumerator(enumerator, inner));
        }
        push_line(&mut body, 0, "");
    }

    for method in &class.methods {
        match method {
            Callable::Compiled(function) => body.push_str(&render_function(function, inner)),
            Callable::Scripted(function) => body.push_str(&render_scripted(function, inner)),
        }
    }

    for nested in &class.classes {
        body.push_str(&render_class(nested, inner));
    }

    let mut output = String::new();
    push_line(&mut output, indent, &format!("class {}:", class.name));
    if body.trim().is_empty() {
        push_line(&mut output, inner, "...");
    } else {
        output.push_str(&body);
    }
    push_line(&mut output, 0, "");

    output
}

/// Render one module-level declaration.
pub fn render_declaration(declaration: &Declaration) -> String {
    match declaration {
        Declaration::Class(class) => render_class(class, 0),
        Declaration::Function(function) => render_function(function, 0),
        Declaration::ScriptedFunction(function) => render_scripted(function, 0),
        Declaration::Property(property) => render_property(property, 0),
        Declaration::Enumerator(enumerator) => render_enumerator(enumerator, 0),
        Declaration::Data { name } => render_data(name, 0),
        Declaration::Submodule { name } => render_submodule(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubgen::model::{OverloadDescriptor, Signature};
    use crate::stubgen::signature::HeuristicSignatureParser;
    use pretty_assertions::assert_eq;

    fn function(name: &str, doc: &str) -> FunctionDescriptor {
        FunctionDescriptor::from_docstring(name, Some(doc), &HeuristicSignatureParser, None).unwrap()
    }

    fn overload(line: &str) -> OverloadDescriptor {
        OverloadDescriptor {
            signature: Signature {
                name: "f".into(),
                parameters: Vec::new(),
                return_type: None,
                line: line.into(),
            },
            body: Vec::new(),
        }
    }

    #[test]
    fn test_two_documented_overloads() {
        let doc = "\noverload1(x: int) -> None\n\nDoes X.\n\noverload2(x: int, y: int) -> None\n\nDoes Y.\n";
        assert_eq!(
            render_function(&function("overload", doc), 0),
            "def overload1(x: int) -> None:\n    \"\"\"\n    Does X.\n\n    \"\"\"\n    ...\n\n\
             @overload\ndef overload2(x: int, y: int) -> None:\n    \"\"\"\n    Does Y.\n    \"\"\"\n    ...\n\n"
        );
    }

    #[test]
    fn test_overload_marker_follows_position() {
        let f = FunctionDescriptor::new(
            "f",
            vec![overload("f(a: int)"), overload("f(b: int)"), overload("f(c: int)")],
        )
        .unwrap();
        assert_eq!(
            render_function(&f, 4),
            "    def f(a: int): ...\n    @overload\n    def f(b: int): ...\n    @overload\n    def f(c: int): ...\n"
        );
    }

    #[test]
    fn test_single_body_line_is_not_documentation() {
        let rendered = render_function(&function("f", "f(x: int) -> int\n"), 0);
        assert_eq!(rendered, "def f(x: int) -> int: ...\n");
    }

    #[test]
    fn test_property_docs() {
        let one_line = PropertyDescriptor {
            name: "width".into(),
            doc: Some("Width in pixels".into()),
        };
        assert_eq!(render_property(&one_line, 4), "    width = ...\n    \"Width in pixels\"\n");

        let quoted = PropertyDescriptor {
            name: "label".into(),
            doc: Some("The \"label\" text".into()),
        };
        assert_eq!(
            render_property(&quoted, 0),
            "label = ...\n\"\"\"\nThe \"label\" text\n\"\"\"\n"
        );

        let bare = PropertyDescriptor {
            name: "x".into(),
            doc: None,
        };
        assert_eq!(render_property(&bare, 0), "x = ...\n");
    }

    #[test]
    fn test_enumerator_rendering() {
        let red = EnumeratorDescriptor::new("Red", Some(0), Some("Colors\n\n  Red : warm\n  Blue : cold"));
        assert_eq!(
            render_enumerator(&red, 4),
            "    Red = 0\n    \"\"\"\n      Red : warm\n    \"\"\"\n"
        );
        let odd = EnumeratorDescriptor::new("Odd", None, Some("Colors"));
        assert_eq!(render_enumerator(&odd, 0), "Odd = ...\n");
    }

    #[test]
    fn test_scripted_function_rendering() {
        let documented = ScriptedFunctionDescriptor::new(
            "load",
            Some("(path)"),
            Some("\n    Load a file.\n\n    Returns the scene.\n    ".into()),
            "mitsuba",
            None,
        );
        assert_eq!(
            render_scripted(&documented, 0),
            "def load(path):\n    \"\"\"\n\n    Load a file.\n\n    Returns the scene.\n\n    \"\"\"\n    ...\n\n"
        );

        let bare = ScriptedFunctionDescriptor::new("f", Some("(x)"), None, "mitsuba", None);
        assert_eq!(render_scripted(&bare, 0), "def f(x): ...\n");
    }

    #[test]
    fn test_class_layout() {
        let class = ClassDescriptor {
            name: "Bitmap".into(),
            doc: Some("\nAn image.\n".into()),
            init: Some(function("__init__", "__init__(self, w: int) -> None\n")),
            call: None,
            properties: vec![PropertyDescriptor {
                name: "width".into(),
                doc: None,
            }],
            enumerators: vec![EnumeratorDescriptor::new("RGB", Some(3), None)],
            methods: vec![Callable::Compiled(function("clear", "clear(self) -> None\n"))],
            classes: vec![ClassDescriptor {
                name: "Format".into(),
                ..Default::default()
            }],
        };

        assert_eq!(
            render_class(&class, 0),
            "class Bitmap:\n\
             \x20   \"\"\"\n\
             \x20   An image.\n\
             \x20   \"\"\"\n\
             \n\
             \x20   def __init__(self, w: int) -> None: ...\n\
             \x20   width = ...\n\
             \n\
             \x20   RGB = 3\n\
             \n\
             \x20   def clear(self) -> None: ...\n\
             \x20   class Format:\n\
             \x20       ...\n\
             \n\
             \n"
        );
    }

    #[test]
    fn test_empty_class_gets_ellipsis_body() {
        let class = ClassDescriptor {
            name: "Empty".into(),
            ..Default::default()
        };
        assert_eq!(render_class(&class, 0), "class Empty:\n    ...\n\n");
    }

    #[test]
    fn test_module_level_declarations() {
        assert_eq!(
            render_declaration(&Declaration::Data { name: "version".into() }),
            "version = ...\n"
        );
        assert_eq!(
            render_declaration(&Declaration::Submodule { name: "math".into() }),
            "\nfrom . import math as math\n\n"
        );
    }
}
