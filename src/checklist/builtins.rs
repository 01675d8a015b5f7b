//! Built-in checklists, in registry order.

use super::rule::PathRule;
use regex::Regex;

/// Matches `cap` as its own path segment or word, e.g. `lib/cap/` or
/// `deploy_cap.rb`, but not `capistrano`.
const CAP_SEGMENT_PATTERN: &str = r"[_./]cap[_./]";

const RUBY_FACTORIES: &str = "
- [ ] RSpec: use [traits](https://robots.thoughtbot.com/remove-duplication-with-factorygirls-traits) to make the default case fast
";

const ELM_FACTORIES: &str = "
- [ ] Elm fuzz tests: use [shortList](https://github.com/NoRedInk/NoRedInk/blob/72626abf20e44eb339dd60ebb716e9447910127f/ui/tests/SpecHelpers.elm#L59) when a list fuzzer is generating too many cases
";

const CAPISTRANO: &str = "
The process for testing capistrano is to deploy the capistrano changes branch to staging prior to merging to master and verify the deploy doesn't explode.

- [ ] Make a branch with capistrano changes
- [ ] Wait for free time to test staging
- [ ] Reset/deploy that branch to staging using the normal jenkins deploy process
- [ ] Verify the deploy passes
  - If it doesn't, fix the branch and redeploy until it works
  - [ ] If it does, reset back to origin/master and request review of the PR
";

const OPSWORKS: &str = "
- [ ] Change the source code branch for staging to the branch being tested in the opsworks UI
- [ ] Rebase your code over `origin/staging` to prevent a successful deploy of your changes from making staging run possibly outdated code
- [ ] Turn on an additional time-based instance in the layer ([see instructions](https://github.com/NoRedInk/wiki/blob/1f618042ed1d6b7c7297ec2672ae568e57944fde/ops-playbook/ops-plays.md#using-opsworks-to-bring-up-an-additional-time-based-instance))
- [ ] Verify that the instances passes setup to online and doesn't fail
";

const ROUTES: &str = "
- [ ] Retired routes are redirected
";

const RESQUE: &str = "
- [ ] Resque jobs should not be allowed to change their `.perform` signature. Rather, create a new resque job and retire the old one post-deploy after the queue is empty
";

const MIGRATIONS: &str = "
- [ ] If there are any potential [Slow Migrations](https://github.com/NoRedInk/wiki/blob/master/Slow-Migrations.md), make sure that:
  - [ ] They are in separate PRs so each can be run independently
  - [ ] There is a deployment plan where the resulting code on prod will support the db schema both before and after the migration
- [ ] If migrations include dropping a column, modifying a column, or adding a non-nullable column, ensure the previously deployed model is prepared to handle both the previous schema and the new schema. ([See \"Rails Migrations with Zero Downtime](https://blog.codeship.com/rails-migrations-zero-downtime/)\")
";

const DOCKERFILE: &str = "
- [ ] If you added a dependency to the Dockerfile for a script that will be called during both CI builds **and** Deploy builds then you should also add that dependency to the chef recipe for [jenkins_common](https://github.com/NoRedInk/NoRedInk-chef/blob/master/site-cookbooks/noredink/recipes/jenkins_common.rb).
  - consequence of not doing this: deploys will break!
";

const NIX: &str = "
- [Instructions on how to use Nix](https://github.com/NoRedInk/wiki/blob/master/engineering/using-nix.md)
- [ ] changes build successfully with Nix (`nix-shell --pure` to check)
- [ ] once approved, but before merging, make sure to update the Nix cache so that other people don't have to rebuild all changes. Run `script/cache_nix_shell.sh`.
";

/// The checklists every registry starts with.
pub fn builtin_checklists() -> Vec<PathRule> {
    vec![
        PathRule::new("RubyFactoriesChecklist", "Ruby Factories", RUBY_FACTORIES)
            .prefix("spec/factories"),
        PathRule::new("ElmFactoriesChecklist", "Elm Factories", ELM_FACTORIES)
            .prefix("ui/tests/"),
        PathRule::new("CapistranoChecklist", "Capistrano", CAPISTRANO)
            .exact("Capfile")
            .exact("Gemfile")
            .prefix("lib/capistrano/")
            .prefix("lib/deploy/")
            .prefix("config/deploy")
            .pattern(Regex::new(CAP_SEGMENT_PATTERN).expect("built-in cap pattern is valid")),
        PathRule::new("OpsWorksChecklist", "OpsWorks", OPSWORKS)
            .prefix("config/deploy")
            .contains("opsworks")
            .prefix("deploy/")
            .prefix("lib/deploy/"),
        PathRule::new("RoutesChecklist", "Routes", ROUTES).exact("config/routes.rb"),
        PathRule::new("ResqueChecklist", "Resque", RESQUE).prefix("app/jobs"),
        PathRule::new("MigrationChecklist", "Migrations", MIGRATIONS).prefix("db/migrate/"),
        PathRule::new("DockerfileChecklist", "Dockerfile", DOCKERFILE).contains("Dockerfile"),
        PathRule::new("NixChecklist", "Nix", NIX)
            .prefix("nix")
            .suffix("nix")
            .exact("Gemfile")
            .exact("Gemfile.lock")
            .suffix("package.json")
            .suffix("package-lock.json")
            .exact("requirements.txt"),
    ]
}
