#![allow(dead_code)]

use deploy_complexity::git::GitRepo;
use git2::{Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway repository that commits with strictly increasing timestamps
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub repo: Repository,
    clock: i64,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn git_repo(&self) -> GitRepo {
        GitRepo::new(self.path()).expect("Failed to create GitRepo")
    }

    fn signature(&mut self) -> Signature<'static> {
        self.clock += 60;
        Signature::new("Test User", "test@example.com", &Time::new(self.clock, 0))
            .expect("Failed to create signature")
    }

    /// Write files, stage everything and commit on the current branch.
    pub fn commit(&mut self, files: &[(&str, &str)], message: &str) -> Oid {
        for (path, content) in files {
            let full = self.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("Failed to create directories");
            }
            fs::write(&full, content).expect("Failed to write file");
        }

        let mut index = self.repo.index().expect("Failed to get repository index");
        index
            .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
            .expect("Failed to add files to index");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let signature = self.signature();
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parents: Vec<git2::Commit> = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        self.repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .expect("Failed to commit")
    }

    /// Create (or move) a branch at `target` and check it out.
    pub fn checkout_new_branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, true)
            .expect("Failed to create branch");
        self.checkout(name);
    }

    pub fn checkout(&self, name: &str) {
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .expect("Failed to set HEAD");
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
            .expect("Failed to checkout branch");
    }

    /// Lightweight tag at `target`
    pub fn tag(&self, name: &str, target: Oid) {
        let object = self
            .repo
            .find_object(target, None)
            .expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &object, false)
            .expect("Failed to create tag");
    }

    /// Merge commit of `other` into the current branch, without touching files.
    pub fn merge_commit(&mut self, other: Oid, message: &str) -> Oid {
        let signature = self.signature();
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to get HEAD commit");
        let theirs = self.repo.find_commit(other).expect("Failed to find commit");
        let mut index = self
            .repo
            .merge_commits(&head, &theirs, None)
            .expect("Failed to merge");
        let tree_id = index
            .write_tree_to(&self.repo)
            .expect("Failed to write merged tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &[&head, &theirs],
            )
            .expect("Failed to commit merge");
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::default().force()))
            .expect("Failed to checkout merge");
        oid
    }
}

/// Creates a temporary Git repository on `main` with an initial commit
pub fn setup_git_repo() -> TestRepo {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let repo = Repository::init(temp_dir.path()).expect("Failed to initialize repository");

    {
        let mut config = repo.config().expect("Failed to get repository config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user email");
    }
    repo.set_head("refs/heads/main")
        .expect("Failed to point HEAD at main");

    let mut test_repo = TestRepo {
        temp_dir,
        repo,
        clock: 1_477_098_000,
    };
    test_repo.commit(&[("initial.txt", "Initial content")], "Initial commit");
    test_repo
}
