use crate::CLAP_STYLING;
use clap::{arg, command};
use sitespeed::handlers::DEFAULT_WEBSITE;
use sitespeed_scanner::PAGESPEED_ENDPOINT;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitespeed")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitespeed")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress non-essential output").required(false))
        .subcommand_required(true)
        .subcommand(
            command!("audit")
                .about(
                    "Audit every page in a website's sitemap with PageSpeed Insights (desktop \
                and mobile) and write a JSON report.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The website whose sitemap.xml lists the pages to audit")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_WEBSITE),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the JSON report")
                        .default_value("report.json"),
                )
                .arg(
                    arg!(-d --"delay" <SECONDS>)
                        .required(false)
                        .help("Pause between pages, to stay inside the API rate limit")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("60"),
                )
                .arg(
                    arg!(-k --"api-key" <KEY>)
                        .required(false)
                        .help("PageSpeed Insights API key (default: $PAGES_SPEED_KEY, .env is read)"),
                )
                .arg(
                    arg!(--"endpoint" <URL>)
                        .required(false)
                        .help("PageSpeed Insights runPagespeed endpoint")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(PAGESPEED_ENDPOINT),
                )
                .arg(
                    arg!(--"summary")
                        .required(false)
                        .help("Print a text summary of the report once it is written")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("sitemap")
                .about("List the pages an audit would visit, in sitemap order")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The website whose sitemap.xml to read")
                        .value_parser(clap::value_parser!(Url))
                        .default_value(DEFAULT_WEBSITE),
                ),
        )
}
