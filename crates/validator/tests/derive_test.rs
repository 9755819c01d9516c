//! End-to-end validation of derived records.

#![cfg(feature = "derive")]

use fieldguard::{
    Engine, Error, Errors, Mode, NameResolver, Record, Validatable, Violation, ViolationKind,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// FIXTURES
// ============================================================================

#[derive(Debug, Clone, Default, Record)]
struct Author {
    #[validate("required, between(2, 40)")]
    #[tag(json = "fullName")]
    pub name: String,
    #[validate("required, email")]
    pub email: String,
}

#[derive(Debug, Clone, Default, Record)]
struct Audit {
    #[validate("required")]
    pub created_by: String,
    #[validate("min(1)")]
    pub revision: u32,
}

#[derive(Debug, Clone, Default, Record)]
#[record(validatable)]
struct Book {
    #[validate("required")]
    pub title: String,
    #[validate("required, len(13), number")]
    #[tag(json = "isbn13")]
    pub isbn: String,
    pub author: Author,
    pub editor: Option<Box<Author>>,
    #[validate("max(3)")]
    pub readers: Vec<Author>,
    #[validate("include(draft, published)")]
    pub status: String,
    #[validate("-")]
    pub drafts: Vec<Author>,
    #[record(embed)]
    audit: Audit,
    #[validate("required")]
    secret: String,
}

impl Validatable for Book {
    fn validate(&self) -> Result<(), Errors> {
        if self.status == "published" && self.editor.is_none() {
            return Err(Errors::from_iter([(
                "editor",
                Violation::custom("editor_required", "published books need an editor"),
            )]));
        }
        Ok(())
    }
}

fn author(name: &str) -> Author {
    Author {
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
    }
}

fn valid_book() -> Book {
    Book {
        title: "Dune".into(),
        isbn: "9780441013593".into(),
        author: author("Frank"),
        editor: None,
        readers: vec![author("Ann"), author("Bob")],
        status: "draft".into(),
        drafts: Vec::new(),
        audit: Audit {
            created_by: "importer".into(),
            revision: 1,
        },
        secret: String::new(),
    }
}

fn paths(errors: &Errors) -> Vec<&str> {
    errors.paths().collect()
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn valid_book_passes() {
    let book = valid_book();
    assert!(fieldguard::validate(&book).is_ok());
    assert!(Engine::new().report(&book).unwrap().is_empty());
    // private fields are not part of the record
    assert!(book.secret.is_empty());
}

#[test]
fn zero_values_fail_required() {
    let errors = Engine::new().report(&Book::default()).unwrap();

    assert_eq!(errors.kinds("title"), [&ViolationKind::Required]);
    assert_eq!(
        errors.kinds("isbn"),
        [&ViolationKind::Required, &ViolationKind::Length, &ViolationKind::Number]
    );
    assert_eq!(errors.kinds("author.name")[0], &ViolationKind::Required);
    assert_eq!(errors.kinds("status"), [&ViolationKind::Include]);
}

#[test]
fn nested_errors_are_path_qualified() {
    let mut book = valid_book();
    book.author.name.clear();
    book.readers[1].name = "x".into();
    book.editor = Some(Box::new(Author {
        name: "Ed".into(),
        email: "not-an-email".into(),
    }));

    let errors = Engine::new().report(&book).unwrap();
    assert_eq!(paths(&errors), ["author.name", "editor.email", "readers.1.name"]);
    assert_eq!(
        errors.kinds("author.name"),
        [&ViolationKind::Required, &ViolationKind::Between]
    );
    assert_eq!(errors.kinds("readers.1.name"), [&ViolationKind::Between]);
    assert_eq!(errors.kinds("editor.email"), [&ViolationKind::Email]);
}

#[test]
fn field_validators_and_recursion_both_apply() {
    let mut book = valid_book();
    book.readers = vec![author("Ann"), author(""), author("Cy"), author("Di")];

    let errors = Engine::new().report(&book).unwrap();
    assert_eq!(paths(&errors), ["readers", "readers.1.email", "readers.1.name"]);
    assert_eq!(errors.kinds("readers"), [&ViolationKind::Max]);
}

#[test]
fn skipped_fields_are_not_descended() {
    let mut book = valid_book();
    book.drafts = vec![Author::default()];
    assert!(Engine::new().report(&book).unwrap().is_empty());
}

#[test]
fn embedded_fields_are_promoted() {
    let mut book = valid_book();
    book.audit = Audit::default();

    let errors = Engine::new().report(&book).unwrap();
    assert_eq!(paths(&errors), ["created_by", "revision"]);
    assert_eq!(errors.kinds("revision"), [&ViolationKind::Min]);
}

#[test]
fn self_validation_runs_after_fields() {
    let mut book = valid_book();
    book.status = "published".into();

    let errors = Engine::new().report(&book).unwrap();
    assert_eq!(paths(&errors), ["editor"]);
    assert_eq!(
        errors.get("editor").unwrap()[0].to_string(),
        "published books need an editor"
    );

    book.editor = Some(Box::new(author("Max")));
    assert!(Engine::new().validate(&book).is_ok());
}

#[test]
fn json_resolver_renames_paths() {
    let engine = Engine::builder()
        .name_resolver(NameResolver::json())
        .build()
        .unwrap();
    let mut book = valid_book();
    book.isbn = "123".into();
    book.author.name.clear();

    let errors = engine.report(&book).unwrap();
    assert_eq!(paths(&errors), ["author.fullName", "isbn13"]);
}

// ============================================================================
// MODES
// ============================================================================

#[rstest]
#[case(Mode::CollectAll, 7)]
#[case(Mode::FirstPerField, 4)]
#[case(Mode::FailFast, 1)]
fn modes(#[case] mode: Mode, #[case] expected: usize) {
    let mut book = valid_book();
    book.title.clear();
    book.isbn.clear();
    book.author.name.clear();
    book.author.email = "nope".into();

    let errors = Engine::new().with_mode(mode).report(&book).unwrap();
    assert_eq!(errors.violation_count(), expected);
}

#[test]
fn fail_fast_stops_before_nested_records() {
    let mut book = valid_book();
    book.title.clear();
    book.author.name.clear();

    let errors = Engine::new()
        .with_mode(Mode::FailFast)
        .report(&book)
        .unwrap();
    assert_eq!(paths(&errors), ["title"]);
}

// ============================================================================
// TOP-LEVEL SHAPES
// ============================================================================

#[test]
fn sequences_of_records_prefix_the_index() {
    let mut broken = valid_book();
    broken.title.clear();

    let errors = Engine::new().report(&vec![valid_book(), broken]).unwrap();
    assert_eq!(paths(&errors), ["1.title"]);
}

#[test]
fn optional_records() {
    let engine = Engine::new();
    assert!(engine.report(&Some(valid_book())).unwrap().is_empty());

    let errors = engine.report(&None::<Book>).unwrap();
    assert_eq!(errors.kinds(""), [&ViolationKind::Unsupported]);
}

#[test]
fn scalars_are_unsupported() {
    let err = fieldguard::validate(&"hello").unwrap_err();
    let errors = err.violations().unwrap();
    assert_eq!(errors.kinds(""), [&ViolationKind::Unsupported]);
}

// ============================================================================
// BORROWED RECORDS
// ============================================================================

#[derive(Debug, Record)]
struct Shelf {
    #[validate("max(3)")]
    pub featured: Vec<&'static Author>,
}

fn nameless() -> Author {
    Author {
        name: String::new(),
        email: "anon@example.com".into(),
    }
}

fn leaked(author: Author) -> &'static Author {
    Box::leak(Box::new(author))
}

#[test]
fn borrowed_top_level_records() {
    let engine = Engine::new();
    let good = author("Ann");
    let bad = nameless();

    let borrowed: &Author = &bad;
    let errors = engine.report(&borrowed).unwrap();
    assert_eq!(paths(&errors), ["name"]);
    assert_eq!(
        errors.kinds("name"),
        [&ViolationKind::Required, &ViolationKind::Between]
    );

    let errors = engine.report(&vec![&good, &bad]).unwrap();
    assert_eq!(paths(&errors), ["1.name"]);
    assert!(engine.validate(&vec![&good]).is_ok());
}

#[test]
fn sequences_of_borrowed_records_are_descended() {
    let shelf = Shelf {
        featured: vec![leaked(author("Ann")), leaked(nameless())],
    };

    let errors = Engine::new().report(&shelf).unwrap();
    assert_eq!(paths(&errors), ["featured.1.name"]);
    assert_eq!(errors.kinds("featured.1.name")[0], &ViolationKind::Required);
}

// ============================================================================
// OPTIONAL EMBEDDED RECORDS
// ============================================================================

#[derive(Debug, Clone, Default, Record)]
#[record(validatable)]
struct Meta {
    #[validate("required")]
    pub owner: String,
    #[validate("min(1)")]
    pub version: u32,
}

impl Validatable for Meta {
    fn validate(&self) -> Result<(), Errors> {
        if self.owner == "root" && self.version > 1 {
            return Err(Errors::from_iter([(
                "owner",
                Violation::custom("root_pinned", "root documents stay at version 1"),
            )]));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Record)]
struct Document {
    #[validate("required")]
    pub title: String,
    #[record(embed)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Default, Record)]
struct Folder {
    pub documents: Vec<Document>,
}

#[derive(Debug, Default, Record)]
#[record(validatable)]
struct Release {
    #[record(embed)]
    pub meta: Meta,
}

impl Validatable for Release {
    fn validate(&self) -> Result<(), Errors> {
        Ok(())
    }
}

fn document(owner: &str, version: u32) -> Document {
    Document {
        title: "Notes".into(),
        meta: Some(Meta {
            owner: owner.to_owned(),
            version,
        }),
    }
}

#[test]
fn absent_embedded_record_reads_as_nil() {
    let errors = Engine::new()
        .report(&Document {
            title: "Notes".into(),
            meta: None,
        })
        .unwrap();

    assert_eq!(paths(&errors), ["owner", "version"]);
    assert_eq!(errors.kinds("owner"), [&ViolationKind::Required]);
    assert_eq!(errors.kinds("version"), [&ViolationKind::Unsupported]);
}

#[test]
fn present_embedded_record_is_promoted() {
    let engine = Engine::new();
    assert!(engine.report(&document("ann", 1)).unwrap().is_empty());

    let errors = engine.report(&document("", 0)).unwrap();
    assert_eq!(paths(&errors), ["owner", "version"]);
    assert_eq!(errors.kinds("version"), [&ViolationKind::Min]);
}

#[test]
fn embedded_self_validation_runs_at_the_owner_path() {
    let engine = Engine::new();
    let pinned = ViolationKind::Custom("root_pinned".into());

    let errors = engine.report(&document("root", 2)).unwrap();
    assert_eq!(paths(&errors), ["owner"]);
    assert_eq!(errors.kinds("owner"), [&pinned]);

    let folder = Folder {
        documents: vec![document("root", 1), document("root", 3)],
    };
    let errors = engine.report(&folder).unwrap();
    assert_eq!(paths(&errors), ["documents.1.owner"]);
    assert_eq!(errors.kinds("documents.1.owner"), [&pinned]);
}

#[test]
fn own_self_validation_shadows_embedded_ones() {
    let release = Release {
        meta: Meta {
            owner: "root".into(),
            version: 2,
        },
    };
    assert!(Engine::new().report(&release).unwrap().is_empty());
}

// ============================================================================
// RECURSIVE TYPES
// ============================================================================

#[derive(Debug, Default, Record)]
struct Category {
    #[validate("required, alphadash")]
    pub slug: String,
    pub parent: Option<Box<Category>>,
    pub children: Vec<Category>,
}

fn category(slug: &str) -> Category {
    Category {
        slug: slug.to_owned(),
        ..Category::default()
    }
}

#[test]
fn self_referencing_records() {
    let engine = Engine::new();
    let tree = Category {
        children: vec![
            category("ok"),
            Category {
                parent: Some(Box::new(category("bad slug"))),
                ..category("child")
            },
        ],
        ..category("root")
    };

    let errors = engine.report(&tree).unwrap();
    assert_eq!(paths(&errors), ["children.1.parent.slug"]);
    assert_eq!(engine.cached_plans(), 1);
}

// ============================================================================
// COMPILE ERRORS
// ============================================================================

#[derive(Debug, Default, Record)]
struct Gadget {
    #[validate("required, shiny")]
    pub label: String,
}

#[derive(Debug, Default, Record)]
struct Broken {
    #[validate("min(1")]
    pub count: i32,
}

#[test]
fn unknown_constraint_fails_the_call() {
    let engine = Engine::new();
    let err = engine.report(&Gadget::default()).unwrap_err();
    assert!(matches!(
        &err,
        Error::UnknownConstraint { name, field } if name == "shiny" && field == "Gadget.label"
    ));
    assert!(err.is_compile_error());
    assert_eq!(engine.cached_plans(), 0);
}

#[test]
fn registering_the_missing_constraint_fixes_compilation() {
    let mut engine = Engine::new();
    assert!(engine.report(&Gadget::default()).is_err());

    engine
        .set_validation_function(
            "shiny",
            Some(fieldguard::evaluator(|value, _| match value.as_str() {
                Some(s) if s.ends_with('!') => Ok(()),
                _ => Err(Violation::custom("shiny", "not shiny")),
            })),
        )
        .unwrap();

    let errors = engine
        .report(&Gadget {
            label: "dull".into(),
        })
        .unwrap();
    assert_eq!(errors.kinds("label"), [&ViolationKind::Custom("shiny".into())]);
}

#[test]
fn malformed_annotation_is_a_syntax_error() {
    let err = Engine::new().report(&Broken::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ViolationKind::Syntax));
    assert!(err.to_string().starts_with("invalid annotation `min(1` on `Broken.count`"));
}

// ============================================================================
// TAGS
// ============================================================================

#[derive(Debug, Default, Record)]
struct Profile {
    #[validate("required")]
    #[tag(strict = "required, alphanumeric, between(3, 16)")]
    pub handle: String,
}

#[test]
fn alternative_tags_select_other_annotations() {
    let profile = Profile {
        handle: "a-b".into(),
    };
    let lenient = Engine::new();
    let strict = lenient.with_tag("strict");

    assert!(lenient.validate(&profile).is_ok());
    let errors = strict.report(&profile).unwrap();
    assert_eq!(errors.kinds("handle"), [&ViolationKind::AlphaNumeric]);
}
