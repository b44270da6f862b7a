use crate::ast;
use crate::operation::infer_variable_definitions;
use crate::operation::normalize_document;
use crate::operation::print_minimal_document;
use crate::operation::print_synthesized_operation;
use crate::operation::Definition;
use crate::operation::DefinitionKind;
use crate::operation::DefinitionRegistry;
use crate::operation::FragmentTable;
use crate::operation::NameError;
use crate::operation::NormalizeError;
use crate::operation::VariableDefinition;
use crate::operation::VariableInferenceError;
use crate::response::Errors;
use crate::response::Response;
use crate::result::derive_result_type;
use crate::result::CastError;
use crate::result::CastValue;
use crate::result::DescriptorBuildError;
use crate::result::ResultObject;
use crate::result::ResultType;
use crate::schema::Schema;
use crate::types::TypeGenerateError;
use crate::types::WrapperArena;
use serde_json::Value as Json;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;
use thiserror::Error;

/// The front door: parses declared definitions against one schema and wires
/// the results to casting, naming, and collocation enforcement.
///
/// One `Client` per schema. Parsing is expected to happen at program startup;
/// everything a `Client` hands out is immutable and shareable across threads.
#[derive(Debug)]
pub struct Client {
    arena: Arc<ArenaCell>,
    enforce_collocation: bool,
    registry: Arc<DefinitionRegistry>,
    schema: Arc<Schema>,
}
impl Client {
    pub fn new(schema: Arc<Schema>) -> Self {
        Client {
            arena: Arc::new(ArenaCell::default()),
            enforce_collocation: true,
            registry: Arc::new(DefinitionRegistry::new()),
            schema,
        }
    }

    /// Toggle collocation enforcement for definitions parsed after the call.
    /// On by default.
    pub fn enforce_collocation(mut self, enforce: bool) -> Self {
        self.enforce_collocation = enforce;
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    /// Parse and compile the definitions in `source`, declared under
    /// `declaration_path` (a `::`-separated namespace; may be empty).
    ///
    /// The calling file is recorded as the declaring file: it becomes the
    /// definitions' source-location file and, when enforcement is on, the
    /// only file allowed to read their cast results.
    #[track_caller]
    pub fn parse(
        &self,
        declaration_path: &str,
        source: &str,
    ) -> Result<Vec<CompiledDefinition>, ParseError> {
        self.parse_with_fragments(declaration_path, source, &FragmentTable::new())
    }

    /// Like [`Client::parse`], resolving interpolated fragment spreads
    /// against previously compiled entries in `fragments`.
    #[track_caller]
    pub fn parse_with_fragments(
        &self,
        declaration_path: &str,
        source: &str,
        fragments: &FragmentTable,
    ) -> Result<Vec<CompiledDefinition>, ParseError> {
        let declaring_file = Arc::new(PathBuf::from(Location::caller().file()));

        let ast_doc = ast::query::parse(source)?;
        let document = normalize_document(
            Some(&self.schema),
            fragments,
            &ast_doc,
            Some(declaring_file.as_path()),
        )
        .map_err(|errors| ParseError::Normalize { errors })?;

        let mut compiled = vec![];
        for definition in document.definitions() {
            self.bind_name(declaration_path, definition)?;
            compiled.push(CompiledDefinition {
                arena: Arc::clone(&self.arena),
                collocated_file: self.enforce_collocation
                    .then(|| Arc::clone(&declaring_file)),
                definition: Arc::clone(definition),
                document_text: OnceLock::new(),
                inferred_variables: OnceLock::new(),
                registry: Arc::clone(&self.registry),
                result_type: OnceLock::new(),
                schema: Arc::clone(&self.schema),
            });
        }

        log::debug!(
            "compiled {} definition(s) under `{declaration_path}` from {}",
            compiled.len(),
            declaring_file.display(),
        );
        Ok(compiled)
    }

    /// Register each compiled fragment into `table` under its declared name,
    /// for spread resolution in later parses.
    pub fn extend_fragment_table(
        &self,
        table: &mut FragmentTable,
        compiled: &[CompiledDefinition],
    ) {
        for definition in compiled {
            if definition.definition.kind() != DefinitionKind::Fragment {
                continue;
            }
            if let Some(name) = definition.definition.declared_name() {
                table.insert_fragment(
                    name,
                    Arc::clone(&definition.definition),
                );
            }
        }
    }

    fn bind_name(
        &self,
        declaration_path: &str,
        definition: &Arc<Definition>,
    ) -> Result<(), NameError> {
        let path = match (declaration_path.is_empty(), definition.declared_name()) {
            (false, Some(name)) => Some(format!("{declaration_path}::{name}")),
            (false, None) => Some(declaration_path.to_string()),
            (true, Some(name)) => Some(name.to_string()),
            (true, None) => None,
        };
        match path {
            Some(path) => self.registry.bind_declaration_path(definition, &path)?,
            None => self.registry.register_anonymous(definition)?,
        };
        Ok(())
    }
}

/// Lazily generated, process-shared wrapper arena for one schema.
#[derive(Debug, Default)]
struct ArenaCell {
    cell: OnceLock<Arc<WrapperArena>>,
}
impl ArenaCell {
    fn get_or_generate(
        &self,
        schema: &Schema,
    ) -> Result<Arc<WrapperArena>, TypeGenerateError> {
        if let Some(arena) = self.cell.get() {
            return Ok(Arc::clone(arena));
        }
        let arena = Arc::new(WrapperArena::generate(schema)?);
        Ok(Arc::clone(self.cell.get_or_init(|| arena)))
    }
}

/// One parsed, named, normalized definition plus everything needed to print
/// and cast it. Cheap to clone-share via its interior [`Arc`]s; the derived
/// pieces (document text, inferred variables, result shape) are computed on
/// first use and memoized.
#[derive(Debug)]
pub struct CompiledDefinition {
    arena: Arc<ArenaCell>,
    collocated_file: Option<Arc<PathBuf>>,
    definition: Arc<Definition>,
    document_text: OnceLock<String>,
    inferred_variables: OnceLock<Vec<VariableDefinition>>,
    registry: Arc<DefinitionRegistry>,
    result_type: OnceLock<ResultType>,
    schema: Arc<Schema>,
}
impl CompiledDefinition {
    pub fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }

    /// The registry-assigned global name.
    pub fn name(&self) -> Result<&str, ClientError> {
        Ok(self.registry.global_name(&self.definition)?)
    }

    /// Minimal executable document text: this definition plus exactly the
    /// fragments it transitively spreads, each printed once.
    pub fn document(&self) -> &str {
        self.document_text.get_or_init(|| {
            let closure = self.registry.fragment_closure(&self.definition);
            print_minimal_document(&closure)
        })
    }

    /// The definition's variable definitions: declared ones for operations,
    /// inferred from argument positions for bare fragments.
    pub fn variables(&self) -> Result<&[VariableDefinition], ClientError> {
        match self.definition.kind() {
            DefinitionKind::Operation(_) =>
                Ok(self.definition.variable_definitions()),

            DefinitionKind::Fragment => {
                if let Some(variables) = self.inferred_variables.get() {
                    return Ok(variables);
                }
                let closure = self.registry.fragment_closure(&self.definition);
                let variables =
                    infer_variable_definitions(&self.schema, &closure)?;
                Ok(self.inferred_variables.get_or_init(|| variables))
            },
        }
    }

    /// Wrap a bare fragment in a synthesized query operation spreading it,
    /// with the inferred variable definitions hoisted onto the operation.
    pub fn synthesize_operation(&self) -> Result<String, ClientError> {
        if self.definition.kind() != DefinitionKind::Fragment {
            return Err(ClientError::SynthesizeNonFragment {
                name: self.name()?.to_string(),
            });
        }
        let closure = self.registry.fragment_closure(&self.definition);
        let variables = self.variables()?;
        Ok(print_synthesized_operation(&closure, variables))
    }

    /// Cast an executed response's `data` payload to this definition's
    /// result shape, wired to the response's error index.
    pub fn cast_response(
        &self,
        response: &Response,
    ) -> Result<CastValue, ClientError> {
        let result_type = self.result_type()?;
        match response.data() {
            None => Ok(CastValue::Null),
            Some(data) => Ok(result_type.cast(data, response.errors())?),
        }
    }

    /// Cast a bare JSON value (no surrounding response envelope, no errors).
    pub fn cast_value(&self, raw: &Json) -> Result<CastValue, ClientError> {
        Ok(self.result_type()?.cast(raw, &Errors::empty())?)
    }

    /// Re-cast a result object produced by a broader definition down to this
    /// one. Legal only when the source definition spreads this fragment.
    pub fn cast_object(
        &self,
        source: &Arc<ResultObject>,
    ) -> Result<Arc<ResultObject>, ClientError> {
        Ok(self.result_type()?.cast_result_object(source)?)
    }

    /// The derived result shape, memoized per definition.
    pub fn result_type(&self) -> Result<&ResultType, ClientError> {
        if let Some(result_type) = self.result_type.get() {
            return Ok(result_type);
        }
        let arena = self.arena.get_or_generate(&self.schema)?;
        let result_type = derive_result_type(
            &self.schema,
            &arena,
            &self.definition,
            self.collocated_file.clone(),
        )?;
        Ok(self.result_type.get_or_init(|| result_type))
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error(
        "Document failed to normalize: {}",
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    )]
    Normalize {
        errors: Vec<NormalizeError>,
    },

    #[error("Syntax error in GraphQL source: {0}")]
    Syntax(#[from] ast::query::ParseError),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorBuildError),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error(
        "`{name}` is not a fragment; only bare fragments synthesize \
        operations"
    )]
    SynthesizeNonFragment {
        name: String,
    },

    #[error(transparent)]
    TypeGenerate(#[from] TypeGenerateError),

    #[error(transparent)]
    VariableInference(#[from] VariableInferenceError),
}
