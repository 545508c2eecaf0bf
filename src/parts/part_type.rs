//! Part types.
//!
//! A composite declares its structural slots as parts:
//!
//! - [`SinglePart`] - one named sub-spec with its own schema. When the author
//!   leaves it out, a default generator may synthesize it from the
//!   composite's detail. An optional single part with nothing to build is
//!   simply dropped from the child list.
//! - [`GroupPart`] - an ordered, homogeneous list of entries. Each entry is
//!   merged with the group defaults and overrides, then validated against
//!   the shared item schema. Zero entries is valid.
//!
//! Either way the built specs are keyed by the part's placeholder token and
//! spliced into the composite's `components` in one pass.

use std::fmt;
use std::rc::Rc;

use super::substitutes::Substitution;
use crate::composite::CompositeDetail;
use crate::error::{BuildError, ValidationErrors};
use crate::schema::{FieldSchema, Processor, Schema, Spec, Value};

/// Turns a validated part spec into a component spec (a widget's sketch).
pub type UnitFn = Rc<dyn Fn(&Spec) -> Result<Spec, BuildError>>;

/// Builds a spec from the owning composite's detail.
pub type DefaultSpecFn = Rc<dyn Fn(&CompositeDetail) -> Spec>;

/// Fields forced onto a part spec, given the composite detail and the raw part spec.
pub type OverridesFn = Rc<dyn Fn(&CompositeDetail, &Spec) -> Spec>;

// =============================================================================
// Single
// =============================================================================

#[derive(Clone)]
pub struct SinglePart {
    name: String,
    placeholder: String,
    required: bool,
    schema: Schema,
    default_spec: Option<DefaultSpecFn>,
    overrides: Option<OverridesFn>,
    unit: Option<UnitFn>,
}

impl SinglePart {
    pub fn new(name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            placeholder: placeholder.into(),
            required: false,
            schema: Schema::default(),
            default_spec: None,
            overrides: None,
            unit: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn default_spec(mut self, f: impl Fn(&CompositeDetail) -> Spec + 'static) -> Self {
        self.default_spec = Some(Rc::new(f));
        self
    }

    pub fn overrides(mut self, f: impl Fn(&CompositeDetail, &Spec) -> Spec + 'static) -> Self {
        self.overrides = Some(Rc::new(f));
        self
    }

    pub fn unit(mut self, f: impl Fn(&Spec) -> Result<Spec, BuildError> + 'static) -> Self {
        self.unit = Some(Rc::new(f));
        self
    }

    fn expand(&self, owner: &CompositeDetail) -> Result<Substitution, BuildError> {
        let raw = match owner.detail().option(&self.name).and_then(Value::to_spec) {
            Some(spec) => spec,
            None => match &self.default_spec {
                Some(generate) => generate(owner),
                None => return Ok(Substitution::Absent),
            },
        };

        let mut spec = raw.clone();
        if !spec.contains("uid") {
            if let Some(uid) = owner.part_uid(&self.name) {
                spec = spec.with("uid", uid);
            }
        }
        if let Some(overrides) = &self.overrides {
            spec = spec.merged(&overrides(owner, &raw));
        }

        let spec = validate_and_build(&self.schema, self.unit.as_ref(), spec)
            .map_err(|err| prefix_validation(err, &self.name))?;
        Ok(Substitution::Single(Value::from(spec)))
    }
}

// =============================================================================
// Group
// =============================================================================

#[derive(Clone)]
pub struct GroupPart {
    name: String,
    unit_name: String,
    placeholder: String,
    required: bool,
    item_schema: Schema,
    defaults: Option<DefaultSpecFn>,
    overrides: Option<OverridesFn>,
    unit: Option<UnitFn>,
}

impl GroupPart {
    /// `name` is the spec field (`tabs`), `unit_name` one entry (`tab`).
    pub fn new(name: impl Into<String>, unit_name: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit_name: unit_name.into(),
            placeholder: placeholder.into(),
            required: false,
            item_schema: Schema::default(),
            defaults: None,
            overrides: None,
            unit: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn item_schema(mut self, schema: Schema) -> Self {
        self.item_schema = schema;
        self
    }

    pub fn defaults(mut self, f: impl Fn(&CompositeDetail) -> Spec + 'static) -> Self {
        self.defaults = Some(Rc::new(f));
        self
    }

    pub fn overrides(mut self, f: impl Fn(&CompositeDetail, &Spec) -> Spec + 'static) -> Self {
        self.overrides = Some(Rc::new(f));
        self
    }

    pub fn unit(mut self, f: impl Fn(&Spec) -> Result<Spec, BuildError> + 'static) -> Self {
        self.unit = Some(Rc::new(f));
        self
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    fn expand(&self, owner: &CompositeDetail) -> Result<Substitution, BuildError> {
        let entries = owner.detail().array(&self.name)?;
        let defaults = self.defaults.as_ref().map(|f| f(owner)).unwrap_or_default();

        let mut built = Vec::with_capacity(entries.len());
        let mut failures = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            let raw = entry.to_spec().unwrap_or_default();
            let mut spec = defaults.merged(&raw);
            if let Some(overrides) = &self.overrides {
                spec = spec.merged(&overrides(owner, &raw));
            }

            match validate_and_build(&self.item_schema, self.unit.as_ref(), spec) {
                Ok(spec) => built.push(Value::from(spec)),
                Err(BuildError::Validation { errors, .. }) => {
                    failures.extend(errors.prefixed(&format!("{}[{index}]", self.name)));
                }
                Err(other) => return Err(other),
            }
        }

        match ValidationErrors::from_vec(failures) {
            Some(errors) => Err(BuildError::validation(self.unit_name.as_str(), errors)),
            None => Ok(Substitution::Group(built)),
        }
    }
}

// =============================================================================
// PartType
// =============================================================================

#[derive(Clone)]
pub enum PartType {
    Single(SinglePart),
    Group(GroupPart),
}

impl PartType {
    pub fn name(&self) -> &str {
        match self {
            PartType::Single(part) => &part.name,
            PartType::Group(part) => &part.name,
        }
    }

    pub fn placeholder(&self) -> &str {
        match self {
            PartType::Single(part) => &part.placeholder,
            PartType::Group(part) => &part.placeholder,
        }
    }

    /// The rule this part adds to the composite schema.
    pub fn field_schema(&self) -> FieldSchema {
        match self {
            PartType::Single(part) if part.required && part.default_spec.is_none() => {
                FieldSchema::required_of(part.name.as_str(), Processor::Object)
            }
            PartType::Single(part) => FieldSchema::option_of(part.name.as_str(), Processor::Object),
            PartType::Group(part) if part.required => {
                FieldSchema::required_of(part.name.as_str(), Processor::ObjectArray)
            }
            PartType::Group(part) => {
                FieldSchema::defaulted_of(part.name.as_str(), Value::Array(Vec::new()), Processor::ObjectArray)
            }
        }
    }

    /// Build this part's child specs from the composite detail.
    pub fn expand(&self, owner: &CompositeDetail) -> Result<Substitution, BuildError> {
        match self {
            PartType::Single(part) => part.expand(owner),
            PartType::Group(part) => part.expand(owner),
        }
    }
}

impl From<SinglePart> for PartType {
    fn from(part: SinglePart) -> Self {
        PartType::Single(part)
    }
}

impl From<GroupPart> for PartType {
    fn from(part: GroupPart) -> Self {
        PartType::Group(part)
    }
}

impl fmt::Debug for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            PartType::Single(_) => "Single",
            PartType::Group(_) => "Group",
        };
        f.debug_struct(kind)
            .field("name", &self.name())
            .field("placeholder", &self.placeholder())
            .finish()
    }
}

/// Validate a part spec, keep every field it carried (the schema only adds
/// defaults), then hand it to the unit.
fn validate_and_build(schema: &Schema, unit: Option<&UnitFn>, spec: Spec) -> Result<Spec, BuildError> {
    let detail = schema
        .validate(&spec)
        .map_err(|errors| BuildError::validation("part", errors))?;
    let spec = spec.merged(&detail.to_spec());
    match unit {
        Some(unit) => unit(&spec),
        None => Ok(spec),
    }
}

fn prefix_validation(err: BuildError, prefix: &str) -> BuildError {
    match err {
        BuildError::Validation { kind, errors } => BuildError::Validation {
            kind,
            errors: errors.prefixed(prefix),
        },
        other => other,
    }
}
