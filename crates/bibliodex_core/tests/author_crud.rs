use bibliodex_core::{
    AuthorInput, AuthorListQuery, AuthorRepository, ErrorKind, PaperInput, PaperRepository,
    RepoError, SqliteAuthorRepository, SqlitePaperRepository, Store, ValidationError,
};

fn setup() -> (SqlitePaperRepository, SqliteAuthorRepository) {
    let store = Store::open_in_memory().unwrap();
    (
        SqlitePaperRepository::new(store.clone()),
        SqliteAuthorRepository::new(store),
    )
}

fn names(query: &AuthorListQuery, authors: &SqliteAuthorRepository) -> Vec<String> {
    authors
        .list_authors(query)
        .unwrap()
        .items
        .into_iter()
        .map(|author| author.name)
        .collect()
}

#[test]
fn create_get_update_roundtrip() {
    let (_papers, authors) = setup();
    let created = authors
        .create_author(&AuthorInput::new("Grace Hopper").with_affiliation("Navy"))
        .unwrap();
    assert_eq!(created.name, "Grace Hopper");
    assert!(created.email.is_none());
    assert!(created.papers.is_empty());

    let updated = authors
        .update_author(
            created.id,
            &AuthorInput::new("Grace M. Hopper").with_email("grace@example.org"),
        )
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Grace M. Hopper");
    assert_eq!(updated.email.as_deref(), Some("grace@example.org"));
    // Unspecified optional fields are overwritten, not merged.
    assert!(updated.affiliation.is_none());

    assert_eq!(authors.get_author(created.id).unwrap(), updated);
}

#[test]
fn create_rejects_blank_name() {
    let (_papers, authors) = setup();
    let err = authors.create_author(&AuthorInput::new("")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::InvalidArgument(ValidationError::BlankAuthorName { index: 0 })
    ));
}

#[test]
fn missing_author_returns_not_found() {
    let (_papers, authors) = setup();
    assert_eq!(
        authors.get_author(77).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        authors
            .update_author(77, &AuthorInput::new("Nobody"))
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        authors.delete_author(77).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn get_author_lists_linked_papers() {
    let (papers, authors) = setup();
    let first = papers
        .create_paper(&PaperInput::new(
            "One",
            "V",
            2001,
            vec![AuthorInput::new("Alice")],
        ))
        .unwrap();
    let second = papers
        .create_paper(&PaperInput::new(
            "Two",
            "V",
            2002,
            vec![AuthorInput::new("Alice"), AuthorInput::new("Bob")],
        ))
        .unwrap();

    let alice = authors.get_author(first.authors[0].id).unwrap();
    assert_eq!(alice.paper_ids(), vec![first.id, second.id]);
    assert_eq!(alice.papers[1].title, "Two");
}

#[test]
fn delete_guard_rejects_sole_author_and_changes_nothing() {
    let (papers, authors) = setup();
    let solo = papers
        .create_paper(&PaperInput::new(
            "Solo",
            "V",
            2010,
            vec![AuthorInput::new("Alice")],
        ))
        .unwrap();
    let alice_id = solo.authors[0].id;

    let err = authors.delete_author(alice_id).unwrap_err();
    match err {
        RepoError::Constraint {
            author_id,
            paper_ids,
        } => {
            assert_eq!(author_id, alice_id);
            assert_eq!(paper_ids, vec![solo.id]);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(authors.get_author(alice_id).unwrap().paper_ids(), vec![solo.id]);
    assert_eq!(papers.get_paper(solo.id).unwrap(), solo);
}

#[test]
fn delete_guard_reports_only_orphaned_papers() {
    let (papers, authors) = setup();
    let shared = papers
        .create_paper(&PaperInput::new(
            "Shared",
            "V",
            2010,
            vec![AuthorInput::new("Alice"), AuthorInput::new("Bob")],
        ))
        .unwrap();
    let solo = papers
        .create_paper(&PaperInput::new(
            "Solo",
            "V",
            2011,
            vec![AuthorInput::new("Alice")],
        ))
        .unwrap();

    let err = authors.delete_author(shared.authors[0].id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint { ref paper_ids, .. } if *paper_ids == vec![solo.id]
    ));
    assert_eq!(papers.get_paper(shared.id).unwrap().authors.len(), 2);
}

#[test]
fn delete_co_author_unlinks_and_removes_author() {
    let (papers, authors) = setup();
    let shared = papers
        .create_paper(&PaperInput::new(
            "Shared",
            "V",
            2010,
            vec![AuthorInput::new("Bob"), AuthorInput::new("Carol")],
        ))
        .unwrap();
    let bob_id = shared.authors[0].id;
    let carol_id = shared.authors[1].id;

    authors.delete_author(bob_id).unwrap();

    let reloaded = papers.get_paper(shared.id).unwrap();
    assert_eq!(reloaded.author_ids(), vec![carol_id]);
    assert_eq!(
        authors.get_author(bob_id).unwrap_err().kind(),
        ErrorKind::NotFound
    );

    // Carol is now the sole author and is protected.
    assert_eq!(
        authors.delete_author(carol_id).unwrap_err().kind(),
        ErrorKind::Constraint
    );
}

#[test]
fn delete_unlinked_author_succeeds() {
    let (_papers, authors) = setup();
    let created = authors.create_author(&AuthorInput::new("Dana")).unwrap();
    authors.delete_author(created.id).unwrap();
    assert_eq!(
        authors.get_author(created.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn list_filters_by_name_and_affiliation_substrings() {
    let (_papers, authors) = setup();
    authors
        .create_author(&AuthorInput::new("Alice Zhang").with_affiliation("Tsinghua University"))
        .unwrap();
    authors
        .create_author(&AuthorInput::new("Bob Stone").with_affiliation("MIT"))
        .unwrap();
    authors
        .create_author(&AuthorInput::new("Alicia Ortiz"))
        .unwrap();
    authors
        .create_author(&AuthorInput::new("Émile Durand").with_affiliation("ÉCOLE Normale"))
        .unwrap();

    let by_name = AuthorListQuery {
        name: Some("ALIC".to_string()),
        ..AuthorListQuery::default()
    };
    assert_eq!(names(&by_name, &authors), vec!["Alice Zhang", "Alicia Ortiz"]);

    let by_affiliation = AuthorListQuery {
        affiliation: Some("university".to_string()),
        ..AuthorListQuery::default()
    };
    assert_eq!(names(&by_affiliation, &authors), vec!["Alice Zhang"]);

    let unicode = AuthorListQuery {
        affiliation: Some("école".to_string()),
        ..AuthorListQuery::default()
    };
    assert_eq!(names(&unicode, &authors), vec!["Émile Durand"]);

    let combined = AuthorListQuery {
        name: Some("ali".to_string()),
        affiliation: Some("mit".to_string()),
        ..AuthorListQuery::default()
    };
    assert!(names(&combined, &authors).is_empty());
}

#[test]
fn list_paginates_in_id_order() {
    let (_papers, authors) = setup();
    for idx in 0..12 {
        authors
            .create_author(&AuthorInput::new(format!("Author {idx:02}")))
            .unwrap();
    }

    let page = authors
        .list_authors(&AuthorListQuery {
            limit: Some(5),
            offset: 10,
            ..AuthorListQuery::default()
        })
        .unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.limit, 5);
    assert_eq!(page.offset, 10);
    let listed: Vec<String> = page.items.into_iter().map(|author| author.name).collect();
    assert_eq!(listed, vec!["Author 10", "Author 11"]);

    let default_page = authors.list_authors(&AuthorListQuery::default()).unwrap();
    assert_eq!(default_page.items.len(), 10);
    assert!(default_page
        .items
        .windows(2)
        .all(|pair| pair[0].id < pair[1].id));
}
