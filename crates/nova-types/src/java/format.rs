//! Java source spelling of [`Type`] values.

use crate::{ClassId, ClassType, Type, TypeEnv, WildcardBound};

/// Canonical (fully qualified) spelling of `ty`, e.g. `java.util.Map.Entry<K, V>`.
#[must_use]
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    TypeFormatter::new(env).format(ty)
}

/// Source name of a binary class name: nested classes use `.` instead of `$`.
pub(crate) fn source_name(binary_name: &str) -> String {
    binary_name.replace('$', ".")
}

/// Configurable type printer.
///
/// By default classes are printed with their fully qualified source names and type
/// arguments are separated by `", "`. Callers that know what is visible at a given
/// location can override how individual class names are spelled.
pub struct TypeFormatter<'a> {
    env: &'a dyn TypeEnv,
    class_name: Option<&'a dyn Fn(ClassId, &str) -> String>,
    arg_separator: &'a str,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(env: &'a dyn TypeEnv) -> Self {
        Self {
            env,
            class_name: None,
            arg_separator: ", ",
        }
    }

    /// Override class name spelling. The callback receives the class id and its binary name.
    #[must_use]
    pub fn with_class_names(mut self, class_name: &'a dyn Fn(ClassId, &str) -> String) -> Self {
        self.class_name = Some(class_name);
        self
    }

    #[must_use]
    pub fn with_arg_separator(mut self, separator: &'a str) -> Self {
        self.arg_separator = separator;
        self
    }

    #[must_use]
    pub fn format(&self, ty: &Type) -> String {
        let mut out = String::new();
        self.write(&mut out, ty);
        out
    }

    fn write(&self, out: &mut String, ty: &Type) {
        match ty {
            Type::Void => out.push_str("void"),
            Type::Null => out.push_str("null"),
            Type::Unknown => out.push_str("<unknown>"),
            Type::Primitive(prim) => out.push_str(prim.keyword()),
            Type::Class(ClassType { def, args }) => {
                let binary = self
                    .env
                    .class(*def)
                    .map(|class| class.name.as_str())
                    .unwrap_or("<missing>");
                match self.class_name {
                    Some(class_name) => out.push_str(&class_name(*def, binary)),
                    None => out.push_str(&source_name(binary)),
                }
                if !args.is_empty() {
                    out.push('<');
                    for (idx, arg) in args.iter().enumerate() {
                        if idx > 0 {
                            out.push_str(self.arg_separator);
                        }
                        self.write(out, arg);
                    }
                    out.push('>');
                }
            }
            Type::Array(elem) => {
                self.write(out, elem);
                out.push_str("[]");
            }
            Type::Ellipsis(elem) => {
                self.write(out, elem);
                out.push_str("...");
            }
            Type::TypeVar(id) => match self.env.type_param(*id) {
                Some(tp) => out.push_str(&tp.name),
                None => out.push_str("<missing>"),
            },
            Type::Wildcard(WildcardBound::Unbounded) => out.push('?'),
            Type::Wildcard(WildcardBound::Extends(upper)) => {
                out.push_str("? extends ");
                self.write(out, upper);
            }
            Type::Wildcard(WildcardBound::Super(lower)) => {
                out.push_str("? super ");
                self.write(out, lower);
            }
            Type::Intersection(parts) => {
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(" & ");
                    }
                    self.write(out, part);
                }
            }
        }
    }
}
