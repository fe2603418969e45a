use std::{fmt::Debug, sync::Arc};

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase, ToTrainCase,
    ToUpperCamelCase,
};

use crate::config::error::ConfigError;

pub type ConvertFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Which naming function applies: ordinary type names, or enum members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    TypeName,
    EnumValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseConvention {
    Pascal,
    Camel,
    Snake,
    Constant,
    Kebab,
    Title,
    Train,
    Upper,
    Lower,
}

impl CaseConvention {
    /// Accepts `pascalCase`, `PascalCase`, `pascal-case` and module-qualified references such as
    /// `change-case-all#pascalCase`.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let name = reference.rsplit('#').next().unwrap_or(reference);
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let convention = match normalized.as_str() {
            "pascalcase" | "pascal" | "uppercamelcase" => CaseConvention::Pascal,
            "camelcase" | "camel" | "lowercamelcase" => CaseConvention::Camel,
            "snakecase" | "snake" => CaseConvention::Snake,
            "constantcase" | "constant" | "shoutysnakecase" => CaseConvention::Constant,
            "paramcase" | "kebabcase" | "kebab" => CaseConvention::Kebab,
            "capitalcase" | "titlecase" | "title" => CaseConvention::Title,
            "headercase" | "traincase" | "train" => CaseConvention::Train,
            "uppercase" | "upper" => CaseConvention::Upper,
            "lowercase" | "lower" => CaseConvention::Lower,
            _ => return None,
        };

        Some(convention)
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            CaseConvention::Pascal => value.to_upper_camel_case(),
            CaseConvention::Camel => value.to_lower_camel_case(),
            CaseConvention::Snake => value.to_snake_case(),
            CaseConvention::Constant => value.to_shouty_snake_case(),
            CaseConvention::Kebab => value.to_kebab_case(),
            CaseConvention::Title => value.to_title_case(),
            CaseConvention::Train => value.to_train_case(),
            CaseConvention::Upper => value.to_uppercase(),
            CaseConvention::Lower => value.to_lowercase(),
        }
    }
}

#[derive(Clone)]
pub enum NamingFunction {
    Keep,
    Case(CaseConvention),
    Custom(ConvertFn),
}

impl NamingFunction {
    pub fn from_reference(reference: &str) -> Result<Self, ConfigError> {
        if reference == "keep" {
            return Ok(NamingFunction::Keep);
        }

        CaseConvention::from_reference(reference)
            .map(NamingFunction::Case)
            .ok_or_else(|| ConfigError::UnknownNamingConvention {
                reference: reference.to_string(),
            })
    }

    fn call(&self, value: &str) -> String {
        match self {
            NamingFunction::Keep => value.to_string(),
            NamingFunction::Case(convention) => convention.apply(value),
            NamingFunction::Custom(convert) => convert(value),
        }
    }
}

impl Debug for NamingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingFunction::Keep => write!(f, "Keep"),
            NamingFunction::Case(convention) => write!(f, "Case({:?})", convention),
            NamingFunction::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// How schema identifiers become output identifiers. Resolved once into a [`NamingResolver`].
#[derive(Debug, Clone)]
pub enum NamingPolicy {
    Keep,
    /// One function for every node kind.
    Custom(NamingFunction),
    /// Independent functions per node kind; a missing one falls back to pascal casing.
    PerKind {
        type_names: Option<NamingFunction>,
        enum_values: Option<NamingFunction>,
        transform_underscore: Option<bool>,
    },
}

impl Default for NamingPolicy {
    fn default() -> Self {
        NamingPolicy::Custom(NamingFunction::Case(CaseConvention::Pascal))
    }
}

#[derive(Debug, Clone)]
struct KindConverter {
    function: NamingFunction,
    transform_underscore: bool,
}

impl KindConverter {
    fn pascal() -> Self {
        Self {
            function: NamingFunction::Case(CaseConvention::Pascal),
            transform_underscore: false,
        }
    }

    fn convert(&self, value: &str, transform_underscore: Option<bool>) -> String {
        if let NamingFunction::Keep = self.function {
            return value.to_string();
        }

        if transform_underscore.unwrap_or(self.transform_underscore) {
            return self.function.call(value);
        }

        value
            .split('_')
            .map(|part| self.function.call(part))
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions<'a> {
    pub prefix: Option<&'a str>,
    pub suffix: Option<&'a str>,
    /// Defaults to true.
    pub use_types_prefix: Option<bool>,
    /// Defaults to true.
    pub use_types_suffix: Option<bool>,
    pub transform_underscore: Option<bool>,
}

impl<'a> ConvertOptions<'a> {
    pub fn with_suffix(suffix: &'a str) -> Self {
        Self {
            suffix: Some(suffix),
            ..Default::default()
        }
    }

    pub fn without_types_affixes(mut self) -> Self {
        self.use_types_prefix = Some(false);
        self.use_types_suffix = Some(false);
        self
    }
}

#[derive(Debug, Clone)]
pub struct NamingResolver {
    type_names: KindConverter,
    enum_values: KindConverter,
    types_prefix: String,
    types_suffix: String,
}

impl Default for NamingResolver {
    fn default() -> Self {
        Self::new(&NamingPolicy::default(), "", "")
    }
}

impl NamingResolver {
    pub fn new(policy: &NamingPolicy, types_prefix: &str, types_suffix: &str) -> Self {
        let (type_names, enum_values) = match policy {
            NamingPolicy::Keep => {
                let keep = KindConverter {
                    function: NamingFunction::Keep,
                    transform_underscore: false,
                };
                (keep.clone(), keep)
            }
            NamingPolicy::Custom(function) => {
                let converter = KindConverter {
                    function: function.clone(),
                    transform_underscore: false,
                };
                (converter.clone(), converter)
            }
            NamingPolicy::PerKind {
                type_names,
                enum_values,
                transform_underscore,
            } => {
                let resolve = |function: &Option<NamingFunction>| match function {
                    Some(function) => KindConverter {
                        function: function.clone(),
                        transform_underscore: transform_underscore.unwrap_or(true),
                    },
                    None => KindConverter {
                        transform_underscore: transform_underscore.unwrap_or(false),
                        ..KindConverter::pascal()
                    },
                };
                (resolve(type_names), resolve(enum_values))
            }
        };

        Self {
            type_names,
            enum_values,
            types_prefix: types_prefix.to_string(),
            types_suffix: types_suffix.to_string(),
        }
    }

    /// `prefix + name + suffix` goes through the naming function of `kind`, then the configured
    /// types prefix and suffix are added unless the options opt out.
    pub fn convert(&self, name: &str, kind: NameKind, options: &ConvertOptions<'_>) -> String {
        let converter = match kind {
            NameKind::TypeName => &self.type_names,
            NameKind::EnumValue => &self.enum_values,
        };

        let raw = format!(
            "{}{}{}",
            options.prefix.unwrap_or_default(),
            name,
            options.suffix.unwrap_or_default()
        );
        let converted = converter.convert(&raw, options.transform_underscore);

        let mut result = String::with_capacity(
            converted.len() + self.types_prefix.len() + self.types_suffix.len(),
        );
        if options.use_types_prefix.unwrap_or(true) {
            result.push_str(&self.types_prefix);
        }
        result.push_str(&converted);
        if options.use_types_suffix.unwrap_or(true) {
            result.push_str(&self.types_suffix);
        }

        result
    }

    pub fn type_name(&self, name: &str) -> String {
        self.convert(name, NameKind::TypeName, &ConvertOptions::default())
    }

    pub fn enum_value(&self, name: &str) -> String {
        self.convert(name, NameKind::EnumValue, &ConvertOptions::default())
    }
}
