//! Command-line interface for the community tooling.
//!
//! Every subcommand is a one-shot pass: read flags and files, do the work,
//! write the result and exit. Errors are printed and turn into exit status 1.

use std::{
    env, io,
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use community::{
    ContributionReportGenerator, Error, HttpOwnersProbe, MembershipSources, OctocrabExecutor, Org, Orgs,
    Owners, OwnersAliases, ReportOptions, Reporter, ReportingMode, SkipRules, generate_reports, read_alumni,
    read_labels, read_orgs, read_owners, read_owners_aliases, read_sigs, validate_sigs, write_alumni,
    write_repo_groups, write_sig_list, write_sigs,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LABELS_PATH: &str =
    "../project-infra/github/ci/prow-deploy/kustom/base/configs/current/labels/labels.yaml";
const DEFAULT_ORGS_PATH: &str = "../project-infra/github/ci/prow-deploy/kustom/base/configs/current/orgs/orgs.yaml";

/// Community governance tooling.
#[derive(Debug, Parser,)]
#[command(name = "community", version, about = "Community governance tooling")]
struct Cli
{
    /// Raise the default log level to debug.
    #[arg(long = "debug", global = true, action = ArgAction::SetTrue)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Report recent activity of one user or of every member of a membership source.
    Contributions(ContributionsArgs,),
    /// Cross-check sigs.yaml and drop broken references.
    ValidateSigs(ValidateSigsArgs,),
    /// Render sigs.yaml into a Markdown overview.
    SigList(SigListArgs,),
    /// Render alumni.yaml into ALUMNI.md.
    Alumni(AlumniArgs,),
    /// Render repo-group SQL from subproject OWNERS references.
    RepoGroups(RepoGroupsArgs,),
    /// Print the resolved membership list.
    Members(MembershipArgs,),
}

/// Sources of the user list.
#[derive(Debug, Args, Default, Clone,)]
struct MembershipArgs
{
    /// Organization name.
    #[arg(long = "org", default_value = "kubevirt")]
    org: String,

    /// Prow orgs.yaml; its members are used when no OWNERS file is given.
    #[arg(long = "orgs-file-path", value_name = "PATH")]
    orgs_file_path: Option<PathBuf,>,

    /// OWNERS file whose reviewers and approvers are reported on.
    #[arg(long = "owners-file-path", value_name = "PATH")]
    owners_file_path: Option<PathBuf,>,

    /// OWNERS_ALIASES file used to expand aliases in the OWNERS file.
    #[arg(long = "owners-aliases-file-path", value_name = "PATH")]
    owners_aliases_file_path: Option<PathBuf,>,
}

impl MembershipArgs
{
    fn has_source(&self,) -> bool
    {
        self.orgs_file_path.is_some() || self.owners_file_path.is_some()
    }
}

#[derive(Debug, Args,)]
struct ContributionsArgs
{
    #[command(flatten)]
    membership: MembershipArgs,

    /// Repository name; leave empty for an organization report.
    #[arg(long = "repo")]
    repo: Option<String,>,

    /// GitHub handle of a single user.
    #[arg(long = "username")]
    username: Option<String,>,

    /// Months to look back.
    #[arg(long = "months", default_value_t = 6)]
    months: u32,

    /// File holding the GitHub token.
    #[arg(long = "github-token", env = "GITHUB_TOKEN_PATH", default_value = "/etc/github/oauth")]
    github_token: PathBuf,

    /// Skip-list override merged on top of the built-in defaults.
    #[arg(long = "report-config-path", value_name = "PATH")]
    report_config_path: Option<PathBuf,>,

    /// Where to write the aggregate YAML report.
    #[arg(long = "report-output-file-path", value_name = "PATH")]
    report_output_file_path: Option<PathBuf,>,

    /// Directory receiving the per-user activity files (default: system temp dir).
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf,>,
}

impl ContributionsArgs
{
    /// The requested user, with blank values treated as absent.
    fn username(&self,) -> Option<&str,>
    {
        self.username.as_deref().map(str::trim,).filter(|name| !name.is_empty(),)
    }

    fn validate(&self,) -> Result<(), Error,>
    {
        if self.username().is_none() && !self.membership.has_source() {
            return Err(Error::validation(
                "username or one of --orgs-file-path, --owners-file-path is required",
            ),);
        }
        if self.months == 0 {
            return Err(Error::validation("months must be greater than zero",),);
        }
        if self.github_token.as_os_str().is_empty() {
            return Err(Error::validation("github token path is required",),);
        }
        Ok((),)
    }

    fn mode(&self,) -> ReportingMode
    {
        match self.username() {
            Some(_,) => ReportingMode::Unconditional,
            None => ReportingMode::InactiveOnly,
        }
    }

    fn report_options(&self,) -> ReportOptions
    {
        ReportOptions {
            org:                      self.membership.org.clone(),
            repo:                     self.repo.clone().filter(|repo| !repo.is_empty(),),
            username:                 self.username().map(str::to_owned,),
            months:                   self.months,
            orgs_file_path:           self.membership.orgs_file_path.clone(),
            owners_file_path:         self.membership.owners_file_path.clone(),
            owners_aliases_file_path: self.membership.owners_aliases_file_path.clone(),
        }
    }
}

#[derive(Debug, Args,)]
struct ValidateSigsArgs
{
    /// Print the result instead of rewriting the file.
    #[arg(
        long = "dry-run",
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    dry_run: bool,

    /// sigs.yaml to check.
    #[arg(long = "sigs-file-path", alias = "sigs_file_path", default_value = "./sigs.yaml")]
    sigs_file_path: PathBuf,

    /// Prow labels.yaml.
    #[arg(long = "labels-file-path", default_value = DEFAULT_LABELS_PATH)]
    labels_file_path: PathBuf,

    /// Prow orgs.yaml.
    #[arg(long = "orgs-file-path", default_value = DEFAULT_ORGS_PATH)]
    orgs_file_path: PathBuf,

    /// Organization whose members may lead groups.
    #[arg(long = "org", default_value = "kubevirt")]
    org: String,
}

#[derive(Debug, Args,)]
struct SigListArgs
{
    #[arg(long = "sigs-file-path", default_value = "./sigs.yaml")]
    sigs_file_path: PathBuf,

    #[arg(long = "output-path", default_value = "./sig-list.md")]
    output_path: PathBuf,
}

#[derive(Debug, Args,)]
struct AlumniArgs
{
    #[arg(long = "alumni-file-path", default_value = "./alumni.yaml")]
    alumni_file_path: PathBuf,

    #[arg(long = "output-path", default_value = "./ALUMNI.md")]
    output_path: PathBuf,
}

#[derive(Debug, Args,)]
struct RepoGroupsArgs
{
    #[arg(long = "sigs-yaml-path", default_value = "./sigs.yaml")]
    sigs_yaml_path: PathBuf,

    #[arg(long = "output-path", default_value = "/tmp/repo_groups.sql")]
    output_path: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main()
{
    let cli = Cli::parse();
    init_tracing(cli.debug,);

    if let Err(error,) = run(cli.command,).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing(debug: bool,)
{
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level,),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).init();
}

/// Executes one subcommand.
///
/// # Errors
///
/// Propagates configuration, query and output errors.
async fn run(command: Command,) -> Result<(), Error,>
{
    match command {
        Command::Contributions(args,) => run_contributions(args,).await,
        Command::ValidateSigs(args,) => run_validate_sigs(args,).await,
        Command::SigList(args,) => {
            let sigs = read_sigs(&args.sigs_file_path,)?;
            write_sig_list(&sigs, &args.output_path,)
        }
        Command::Alumni(args,) => {
            let alumni = read_alumni(&args.alumni_file_path,)?;
            write_alumni(&alumni, &args.output_path,)
        }
        Command::RepoGroups(args,) => {
            require_file(&args.sigs_yaml_path,)?;
            let sigs = read_sigs(&args.sigs_yaml_path,)?;
            write_repo_groups(&sigs, &args.output_path,)
        }
        Command::Members(args,) => {
            for handle in resolve_members(&args,)? {
                println!("{handle}");
            }
            Ok((),)
        }
    }
}

fn require_file(path: &Path,) -> Result<(), Error,>
{
    if path.as_os_str().is_empty() {
        return Err(Error::validation("file path is required",),);
    }
    if !path.exists() {
        return Err(Error::validation(format!("file {} does not exist", path.display()),),);
    }
    Ok((),)
}

/// Loaded membership inputs; the borrowed [`MembershipSources`] view is
/// taken from here.
struct LoadedMembership
{
    orgs:    Option<Orgs,>,
    owners:  Option<Owners,>,
    aliases: Option<OwnersAliases,>,
}

impl LoadedMembership
{
    fn load(args: &MembershipArgs,) -> Result<Self, Error,>
    {
        Ok(Self {
            orgs:    args.orgs_file_path.as_deref().map(read_orgs,).transpose()?,
            owners:  args.owners_file_path.as_deref().map(read_owners,).transpose()?,
            aliases: args.owners_aliases_file_path.as_deref().map(read_owners_aliases,).transpose()?,
        },)
    }

    fn resolve(&self, org_name: &str,) -> Result<Vec<String,>, Error,>
    {
        // org members only stand in when there is no OWNERS file
        let org_members: Option<&Org,> = match (&self.orgs, &self.owners,) {
            (Some(orgs,), None,) => Some(orgs.org(org_name,)?,),
            _ => None,
        };
        let sources = MembershipSources {
            owners: self.owners.as_ref(),
            aliases: self.aliases.as_ref(),
            org_members,
        };
        Ok(sources.resolve(),)
    }
}

fn resolve_members(args: &MembershipArgs,) -> Result<Vec<String,>, Error,>
{
    if !args.has_source() {
        return Err(Error::validation("one of --orgs-file-path, --owners-file-path is required",),);
    }
    LoadedMembership::load(args,)?.resolve(&args.org,)
}

async fn run_contributions(args: ContributionsArgs,) -> Result<(), Error,>
{
    args.validate()?;
    let skip_rules = SkipRules::load(args.report_config_path.as_deref(),)?;

    let users = match args.username() {
        Some(username,) => vec![username.to_owned()],
        None => resolve_members(&args.membership,)?,
    };
    info!("Reporting on {} users", users.len());

    let executor = OctocrabExecutor::from_token_file(&args.github_token,)?;
    let generator =
        ContributionReportGenerator::new(executor, args.membership.org.clone(), args.repo.as_deref(), args.months,);

    let output_dir = args.output_dir.clone().unwrap_or_else(env::temp_dir,);
    let mut reporter = Reporter::new(args.mode(), args.report_options(), skip_rules.clone(), output_dir,);

    generate_reports(&generator, &users, &skip_rules, &mut reporter,).await?;

    let summary = reporter.summary()?;
    if !summary.is_empty() {
        print!("{summary}");
    }
    if let Some(path,) = &args.report_output_file_path {
        reporter.full().write_to(path,)?;
    }
    Ok((),)
}

async fn run_validate_sigs(args: ValidateSigsArgs,) -> Result<(), Error,>
{
    require_file(&args.sigs_file_path,)?;
    info!("dry-run: {}", args.dry_run);

    let mut sigs = read_sigs(&args.sigs_file_path,)?;
    let labels = read_labels(&args.labels_file_path,)?;
    let orgs = read_orgs(&args.orgs_file_path,)?;
    let org = orgs.org(&args.org,)?;
    debug!("Validating against {} members of {}", org.all_members().count(), args.org);

    validate_sigs(&mut sigs, &labels, org, &HttpOwnersProbe::default(),).await;
    write_sigs(&sigs, &args.sigs_file_path, args.dry_run,)
}
