//! Resolved configuration, threaded explicitly through the search and notify
//! paths.

use crate::cli::{NotifyArgs, SearchArgs};
use crate::errors::AppError;
use crate::mailer::smtp_server_for;
use crate::notify::FormatOptions;
use crate::scraper::{QueryError, SearchFilters};
use std::path::PathBuf;
use std::time::Duration;

/// Logging setup
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub logfile: Option<PathBuf>,
}

/// Terms, filters and fetch limits shared by both commands
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub terms: Vec<String>,
    pub filters: SearchFilters,
    pub workers: usize,
    pub timeout: Duration,
}

/// How mail leaves the process
#[derive(Debug, Clone, PartialEq)]
pub enum MailSettings {
    Smtp { server: String, password: String },
    Brevo { api_key: String },
}

/// Everything the notifier loop needs
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyConfig {
    pub search: SearchConfig,
    pub sender: String,
    pub recipient: String,
    /// Receives failure reports.
    pub operator: String,
    pub format: FormatOptions,
    pub char_limit: Option<usize>,
    pub interval: Duration,
    pub save_path: Option<PathBuf>,
    pub repeated_failures: u32,
}

impl TryFrom<&SearchArgs> for SearchConfig {
    type Error = QueryError;

    fn try_from(args: &SearchArgs) -> Result<Self, Self::Error> {
        let flag = |b: bool| if b { "1" } else { "0" };

        let mut pairs: Vec<(&str, String)> = vec![
            ("min_price", args.min_price.clone()),
            ("max_price", args.max_price.clone()),
            ("expandSearch", flag(args.expand_search).to_string()),
            ("sort", flag(args.reverse).to_string()),
            ("sold", flag(args.sold).to_string()),
        ];
        let optional = [
            ("category", &args.category),
            ("subCategory", &args.sub_category),
            ("zip", &args.zip),
            ("city", &args.city),
            ("state", &args.state),
            ("miles", &args.miles),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(k, v)| v.clone().map(|v| (k, v))),
        );

        Ok(Self {
            terms: args.query.clone(),
            filters: SearchFilters::from_pairs(pairs)?,
            workers: args.workers.max(1),
            timeout: Duration::from_secs(args.timeout),
        })
    }
}

impl NotifyConfig {
    /// Resolves notifier settings plus the mail transport choice.
    pub fn from_args(args: &NotifyArgs) -> Result<(Self, MailSettings), AppError> {
        let search = SearchConfig::try_from(&args.search)?;

        if !args.email.contains('@') {
            return Err(AppError::Config(format!(
                "'{}' is not an email address",
                args.email
            )));
        }

        let mail = match (&args.brevo_api_key, &args.password) {
            (Some(api_key), _) => MailSettings::Brevo {
                api_key: api_key.clone(),
            },
            (None, Some(password)) => MailSettings::Smtp {
                server: match &args.smtpserver {
                    Some(server) if !server.is_empty() => server.clone(),
                    _ => smtp_server_for(&args.email)?,
                },
                password: password.clone(),
            },
            (None, None) => {
                return Err(AppError::Config(
                    "a password (--password or KSL_NOTIFY_PASSWORD) or a Brevo API key is required"
                        .to_string(),
                ))
            }
        };

        let config = Self {
            search,
            sender: args.email.clone(),
            recipient: args.to_email.clone().unwrap_or_else(|| args.email.clone()),
            operator: args
                .exception_email
                .clone()
                .unwrap_or_else(|| args.email.clone()),
            format: FormatOptions {
                head: args.head.filter(|&n| n > 0),
                exclude_links: args.exclude_links,
            },
            char_limit: args.char_limit.filter(|&limit| limit > 0),
            interval: Duration::from_secs(args.time.saturating_mul(60)),
            save_path: args.save.clone(),
            repeated_failures: args.email_exceptions,
        };

        Ok((config, mail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn notify_args(extra: &[&str]) -> NotifyArgs {
        let mut argv = vec!["ksl", "notify", "bike"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Notify(args) => args,
            Command::Search(_) => panic!("expected notify"),
        }
    }

    #[test]
    fn search_args_become_filters() {
        let cli = Cli::try_parse_from([
            "ksl", "search", "bike", "kayak", "-m", "100", "-M", "20", "--city", "Provo", "-r",
        ])
        .unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };

        let config = SearchConfig::try_from(&args).unwrap();

        assert_eq!(config.terms, vec!["bike", "kayak"]);
        assert_eq!(config.filters.price_bounds(), (Some(20), Some(100)));
        assert_eq!(config.filters.city.as_deref(), Some("Provo"));
        assert!(config.filters.sort);
        assert_eq!(config.workers, 4);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_price_fails_before_anything_runs() {
        let cli = Cli::try_parse_from(["ksl", "search", "bike", "-M", "lots"]).unwrap();
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };

        assert!(SearchConfig::try_from(&args).is_err());
    }

    #[test]
    fn receivers_default_to_sender() {
        let args = notify_args(&["--email", "me@gmail.com", "--password", "pw"]);

        let (config, mail) = NotifyConfig::from_args(&args).unwrap();

        assert_eq!(config.recipient, "me@gmail.com");
        assert_eq!(config.operator, "me@gmail.com");
        assert_eq!(config.interval, Duration::from_secs(600));
        assert_eq!(config.repeated_failures, 5);
        assert_eq!(
            mail,
            MailSettings::Smtp {
                server: "smtp.gmail.com:587".into(),
                password: "pw".into()
            }
        );
    }

    #[test]
    fn explicit_options_are_kept() {
        let args = notify_args(&[
            "--email", "me@example.org", "--password", "pw", "--smtpserver", "mail.example.org:25",
            "--to-email", "phone@sms.example", "--exception-email", "ops@example.org", "-t", "3",
            "-H", "2", "-C", "160", "-X", "-S", "seen.json",
        ]);

        let (config, mail) = NotifyConfig::from_args(&args).unwrap();

        assert_eq!(config.recipient, "phone@sms.example");
        assert_eq!(config.operator, "ops@example.org");
        assert_eq!(config.interval, Duration::from_secs(180));
        assert_eq!(config.char_limit, Some(160));
        assert_eq!(
            config.format,
            FormatOptions {
                head: Some(2),
                exclude_links: true
            }
        );
        assert_eq!(config.save_path, Some(PathBuf::from("seen.json")));
        assert!(matches!(mail, MailSettings::Smtp { ref server, .. } if server == "mail.example.org:25"));
    }

    #[test]
    fn zero_head_and_limit_mean_unlimited() {
        let args = notify_args(&[
            "--email", "me@gmail.com", "--password", "pw", "-H", "0", "-C", "0",
        ]);

        let (config, _) = NotifyConfig::from_args(&args).unwrap();

        assert_eq!(config.format.head, None);
        assert_eq!(config.char_limit, None);
    }

    #[test]
    fn unknown_provider_without_server_is_fatal() {
        let args = notify_args(&["--email", "me@example.org", "--password", "pw"]);
        assert!(matches!(
            NotifyConfig::from_args(&args),
            Err(AppError::Mailer(_))
        ));
    }

    #[test]
    fn brevo_key_selects_brevo() {
        let args = notify_args(&["--email", "me@example.org", "--brevo-api-key", "key"]);

        let (_, mail) = NotifyConfig::from_args(&args).unwrap();

        assert_eq!(
            mail,
            MailSettings::Brevo {
                api_key: "key".into()
            }
        );
    }
}
