//! Offline stand-ins for the live remote

use std::path::Path;

use git2::{Repository, RepositoryInitOptions, Signature};

/// Create a bare repository at `dir` with one commit on `main`
///
/// Returns the clone URL, which is just the path; libgit2 clones local
/// paths over its local transport.
pub(crate) fn bare_remote(dir: &Path) -> String {
    let mut opts = RepositoryInitOptions::new();
    opts.bare(true).initial_head("main");
    let repo = Repository::init_opts(dir, &opts).unwrap();

    let blob = repo.blob(b"# probe remote\n").unwrap();
    let mut builder = repo.treebuilder(None).unwrap();
    builder.insert("README.md", blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();

    let sig = Signature::now("Test User", "test@test.com").unwrap();
    repo.commit(Some("refs/heads/main"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap();

    dir.to_str().unwrap().to_string()
}

/// Id of the commit `branch` points at in the repository at `dir`
pub(crate) fn branch_tip(dir: &Path, branch: &str) -> git2::Oid {
    let repo = Repository::open(dir).unwrap();
    let reference = repo.find_reference(&format!("refs/heads/{}", branch)).unwrap();
    reference.target().unwrap()
}
