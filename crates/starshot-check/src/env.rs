use std::sync::Arc;

use starshot_ir::TypeExpr;

struct Scope {
    name: String,
    ty: Option<TypeExpr>,
    parent: Option<Arc<Scope>>,
}

/// Persistent name to type map.
///
/// Extending an environment returns a new one sharing its parent's bindings,
/// so sibling scopes never observe each other and the value is `Send + Sync`.
/// A binding whose type is `None` is in scope but its type was not inferred.
#[derive(Clone, Default)]
pub struct TypeEnv {
    head: Option<Arc<Scope>>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment holding `bindings`, later entries shadowing earlier ones.
    pub fn from_bindings<'a>(bindings: impl IntoIterator<Item = (&'a str, Option<&'a TypeExpr>)>) -> Self {
        bindings
            .into_iter()
            .fold(Self::new(), |env, (name, ty)| env.bind(name, ty.cloned()))
    }

    #[must_use]
    pub fn bind(&self, name: impl Into<String>, ty: Option<TypeExpr>) -> TypeEnv {
        TypeEnv {
            head: Some(Arc::new(Scope {
                name: name.into(),
                ty,
                parent: self.head.clone(),
            })),
        }
    }

    /// `None` when the name is unbound, `Some(None)` when bound without a known type.
    pub fn lookup(&self, name: &str) -> Option<Option<&TypeExpr>> {
        let mut scope = self.head.as_deref();
        while let Some(current) = scope {
            if current.name == name {
                return Some(current.ty.as_ref());
            }
            scope = current.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl std::fmt::Debug for TypeEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        let mut scope = self.head.as_deref();
        while let Some(current) = scope {
            list.entry(&(&current.name, &current.ty));
            scope = current.parent.as_deref();
        }
        list.finish()
    }
}
