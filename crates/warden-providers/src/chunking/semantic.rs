use tree_sitter::{Node, Parser};
use warden_domain::entities::{Chunk, ProjectId, SemanticType};
use warden_domain::error::{Error, Result};
use warden_domain::ports::{ChunkerOptions, Tokenizer};

use super::common::{build_chunk, emit_sliding_window};

struct LanguageSpec {
    language: tree_sitter::Language,
    name: &'static str,
    kinds: &'static [(&'static str, SemanticType)],
}

fn language_spec_for(extension: &str) -> Option<LanguageSpec> {
    match extension {
        "rs" => Some(LanguageSpec {
            language: tree_sitter_rust::LANGUAGE.into(),
            name: "rust",
            kinds: &[
                ("function_item", SemanticType::Method),
                ("struct_item", SemanticType::Struct),
                ("enum_item", SemanticType::Enum),
                ("trait_item", SemanticType::Interface),
                ("impl_item", SemanticType::Class),
                ("mod_item", SemanticType::Namespace),
            ],
        }),
        "py" => Some(LanguageSpec {
            language: tree_sitter_python::LANGUAGE.into(),
            name: "python",
            kinds: &[
                ("function_definition", SemanticType::Method),
                ("class_definition", SemanticType::Class),
            ],
        }),
        "js" | "jsx" | "mjs" => Some(LanguageSpec {
            language: tree_sitter_javascript::LANGUAGE.into(),
            name: "javascript",
            kinds: &[
                ("function_declaration", SemanticType::Method),
                ("class_declaration", SemanticType::Class),
            ],
        }),
        "ts" | "tsx" => Some(LanguageSpec {
            language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            name: "typescript",
            kinds: &[
                ("function_declaration", SemanticType::Method),
                ("class_declaration", SemanticType::Class),
                ("interface_declaration", SemanticType::Interface),
            ],
        }),
        "go" => Some(LanguageSpec {
            language: tree_sitter_go::LANGUAGE.into(),
            name: "go",
            kinds: &[
                ("function_declaration", SemanticType::Method),
                ("method_declaration", SemanticType::Method),
                ("type_declaration", SemanticType::Struct),
            ],
        }),
        "java" => Some(LanguageSpec {
            language: tree_sitter_java::LANGUAGE.into(),
            name: "java",
            kinds: &[
                ("class_declaration", SemanticType::Class),
                ("interface_declaration", SemanticType::Interface),
                ("enum_declaration", SemanticType::Enum),
                ("method_declaration", SemanticType::Method),
            ],
        }),
        _ => None,
    }
}

fn line_number_at(content: &str, byte_offset: usize) -> u32 {
    content.as_bytes()[..byte_offset].iter().filter(|&&b| b == b'\n').count() as u32 + 1
}

/// Attempts boundary-aware chunking of `content` via a tree-sitter
/// grammar matching `file_path`'s extension. Returns `None` when no
/// grammar is registered for the extension, so the caller can fall back
/// to a pure sliding window.
///
/// # Errors
/// Returns an error if the grammar fails to load.
pub fn chunk_file_semantic(
    project_id: ProjectId,
    file_path: &str,
    content: &str,
    tokenizer: &dyn Tokenizer,
    options: ChunkerOptions,
) -> Result<Option<Vec<Chunk>>> {
    let extension = file_path.rsplit('.').next().unwrap_or("");
    let Some(spec) = language_spec_for(extension) else {
        return Ok(None);
    };

    let mut parser = Parser::new();
    parser
        .set_language(&spec.language)
        .map_err(|e| Error::Fatal(format!("failed to load {} grammar: {e}", spec.name)))?;
    let Some(tree) = parser.parse(content, None) else {
        return Ok(None);
    };

    let root = tree.root_node();
    let mut chunks = Vec::new();
    let mut filler_start_byte = 0usize;

    let mut cursor = root.walk();
    let children: Vec<Node> = root.children(&mut cursor).collect();

    for child in &children {
        let Some((_, semantic_type)) = spec.kinds.iter().find(|(kind, _)| *kind == child.kind()) else {
            continue;
        };

        if child.start_byte() > filler_start_byte {
            let filler_text = &content[filler_start_byte..child.start_byte()];
            let filler_start_line = line_number_at(content, filler_start_byte);
            emit_sliding_window(&mut chunks, project_id, file_path, filler_text, filler_start_line, tokenizer, options, spec.name, None, None);
        }

        let name = child
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(content.as_bytes()).ok())
            .map(str::to_string);

        let node_text = &content[child.start_byte()..child.end_byte()];
        let token_count = tokenizer.count_tokens(node_text) as u32;
        let start_line = child.start_position().row as u32 + 1;
        let end_line = child.end_position().row as u32 + 1;

        if token_count <= options.max_chunk_tokens {
            if token_count >= options.min_chunk_tokens {
                chunks.push(build_chunk(
                    project_id,
                    file_path,
                    node_text,
                    start_line,
                    end_line,
                    token_count,
                    spec.name,
                    Some(*semantic_type),
                    name,
                    0,
                    1,
                    options.store_chunk_text,
                ));
            }
        } else {
            emit_sliding_window(&mut chunks, project_id, file_path, node_text, start_line, tokenizer, options, spec.name, Some(*semantic_type), name);
        }

        filler_start_byte = child.end_byte();
    }

    if filler_start_byte < content.len() {
        let filler_text = &content[filler_start_byte..];
        let filler_start_line = line_number_at(content, filler_start_byte);
        emit_sliding_window(&mut chunks, project_id, file_path, filler_text, filler_start_line, tokenizer, options, spec.name, None, None);
    }

    Ok(Some(chunks))
}
