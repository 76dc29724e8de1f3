//! JSON form of a declaration graph
//!
//! ```json
//! {
//!   "declarations": [
//!     {
//!       "name": "Account",
//!       "qualifier": "Confidential",
//!       "members": [
//!         { "name": "ssn", "kind": "field", "type": { "qualifier": "HighlyConfidential" } },
//!         { "name": "owner", "kind": "field", "type": { "declared": "User" } },
//!         { "name": "tags", "kind": "method", "type": { "array": { "qualifier": "Confidential[billing]" } } },
//!         { "name": "close", "kind": "method" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use dcc_core::model::{AnnotatedType, Declaration, DeclarationGraph, Member, MemberKind};
use dcc_core::{Catalog, Qualifier};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphFile {
    pub declarations: Vec<DeclarationSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationSpec {
    pub name: String,
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKindSpec {
    Field,
    Method,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSpec {
    pub name: String,
    pub kind: MemberKindSpec,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub array: Option<Box<TypeSpec>>,
    #[serde(default)]
    pub declared: Option<String>,
    #[serde(default)]
    pub args: Vec<TypeSpec>,
}

impl GraphFile {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("malformed declaration graph")
    }

    /// Resolve qualifier spellings against `catalog` and build the graph
    pub fn into_graph(self, catalog: &Catalog) -> Result<DeclarationGraph> {
        let mut graph = DeclarationGraph::new();
        for decl in self.declarations {
            let qualifier = parse_optional(catalog, decl.qualifier.as_deref())
                .with_context(|| format!("declaration {}", decl.name))?;
            let mut declaration = Declaration::new(decl.name.clone(), qualifier);
            for member in decl.members {
                let context = format!("member {}.{}", decl.name, member.name);
                declaration.members.push(member.into_member(catalog).context(context)?);
            }
            graph.insert(declaration)?;
        }
        Ok(graph)
    }
}

impl MemberSpec {
    fn into_member(self, catalog: &Catalog) -> Result<Member> {
        let ty = self.ty.map(|ty| ty.into_type(catalog)).transpose()?;
        let kind = match self.kind {
            MemberKindSpec::Field => MemberKind::Field,
            MemberKindSpec::Method => MemberKind::Method,
        };
        if kind == MemberKind::Field && ty.is_none() {
            bail!("field has no type");
        }
        Ok(Member {
            name: self.name,
            kind,
            is_static: self.is_static,
            ty,
        })
    }
}

impl TypeSpec {
    fn into_type(self, catalog: &Catalog) -> Result<AnnotatedType> {
        let qualifier = parse_optional(catalog, self.qualifier.as_deref())?;
        match (self.array, self.declared) {
            (Some(_), Some(_)) => bail!("a type is either an array or a declared type, not both"),
            (Some(element), None) => {
                if !self.args.is_empty() {
                    bail!("array types take no type arguments");
                }
                Ok(AnnotatedType::array(qualifier, element.into_type(catalog)?))
            }
            (None, Some(name)) => {
                let args = self
                    .args
                    .into_iter()
                    .map(|arg| arg.into_type(catalog))
                    .collect::<Result<Vec<_>>>()?;
                Ok(AnnotatedType::declared(name, qualifier, args))
            }
            (None, None) => {
                if !self.args.is_empty() {
                    bail!("type arguments given without a declared type name");
                }
                Ok(AnnotatedType::leaf(qualifier))
            }
        }
    }
}

fn parse_optional(catalog: &Catalog, text: Option<&str>) -> Result<Option<Qualifier>> {
    text.map(|text| catalog.parse_qualifier(text))
        .transpose()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcc_core::model::TypeShape;

    #[test]
    fn test_parse_full_graph() {
        let catalog = Catalog::standard();
        let file = GraphFile::from_json(
            r#"{
                "declarations": [
                    {
                        "name": "Account",
                        "qualifier": "NonConfidential",
                        "members": [
                            { "name": "ssn", "kind": "field", "type": { "qualifier": "HighlyConfidential" } },
                            {
                                "name": "owner",
                                "kind": "field",
                                "static": true,
                                "type": { "declared": "User", "args": [{}] }
                            },
                            {
                                "name": "tags",
                                "kind": "method",
                                "type": { "array": { "qualifier": "Confidential[billing]" } }
                            },
                            { "name": "close", "kind": "method" }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        let graph = file.into_graph(&catalog).unwrap();

        let account = graph.get(graph.require("Account").unwrap()).unwrap();
        assert_eq!(account.qualifier, Some(catalog.parse_qualifier("Public").unwrap()));
        assert_eq!(account.members.len(), 4);
        assert!(account.members[1].is_static);
        assert!(matches!(
            account.members[1].ty.as_ref().map(|t| &t.shape),
            Some(TypeShape::Declared { args, .. }) if args.len() == 1
        ));
        assert!(matches!(account.members[2].ty.as_ref().map(|t| &t.shape), Some(TypeShape::Array(_))));
        assert!(account.members[3].ty.is_none());
    }

    #[test]
    fn test_field_without_type_rejected() {
        let file =
            GraphFile::from_json(r#"{"declarations": [{"name": "A", "members": [{"name": "x", "kind": "field"}]}]}"#)
                .unwrap();
        let err = file.into_graph(&Catalog::standard()).unwrap_err();
        assert!(format!("{err:#}").contains("member A.x"));
    }

    #[test]
    fn test_unknown_qualifier_rejected() {
        let file = GraphFile::from_json(r#"{"declarations": [{"name": "A", "qualifier": "TopSecret"}]}"#).unwrap();
        let err = file.into_graph(&Catalog::standard()).unwrap_err();
        assert!(format!("{err:#}").contains("TopSecret"));
    }

    #[test]
    fn test_array_and_declared_conflict() {
        let file = GraphFile::from_json(
            r#"{"declarations": [
                {"name": "A", "members": [{"name": "x", "kind": "field", "type": {"array": {}, "declared": "B"}}]}
            ]}"#,
        )
        .unwrap();
        assert!(file.into_graph(&Catalog::standard()).is_err());
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let file = GraphFile::from_json(
            r#"{"declarations": [
                {"name": "A", "members": [{"name": "key", "kind": "field", "type": {"qualifier": "Critical"}}]},
                {"name": "A"}
            ]}"#,
        )
        .unwrap();
        let err = file.into_graph(&Catalog::standard()).unwrap_err();
        assert!(format!("{err:#}").contains("declaration 'A' defined more than once"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(GraphFile::from_json(r#"{"declarations": [], "extra": 1}"#).is_err());
    }
}
