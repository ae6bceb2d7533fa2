use super::ORIGIN;
use crate::{CrawlerError, PageNode, PageParser, ParsedPage, RowCells};
use lazy_regex::regex;
use lazy_static::lazy_static;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

const E: &str = "Invalid selector";
lazy_static! {
    static ref RESULTS_TABLE: Selector = Selector::parse(
        "div#livescore .panel.panel-info .panel-body table.table.table-striped.table-hover"
    )
    .expect(E);
    static ref PREVIOUS: Selector = Selector::parse("a.objselect_prevnext.objselect_prec").expect(E);
    static ref DAY: Selector = Selector::parse("tr th").expect(E);
    static ref HOME_TEAM: Selector = Selector::parse(".lm3 .lm3_eq1").expect(E);
    static ref AWAY_TEAM: Selector = Selector::parse(".lm3 .lm3_eq2").expect(E);
    static ref SCORE: Selector = Selector::parse(".lm3 .lm3_score").expect(E);
    static ref KICKOFF: Selector = Selector::parse(".lm1").expect(E);
}

#[derive(Debug, Default)]
pub struct MatchEnDirectParser;

impl PageParser for MatchEnDirectParser {
    fn parse(&self, html: &str) -> Result<ParsedPage, CrawlerError> {
        let doc = Html::parse_document(html);

        // A broken link only ends the walk, the rows of this page are kept.
        let previous_page_url = doc
            .select(&PREVIOUS)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| {
                match Url::parse(ORIGIN).and_then(|origin| origin.join(href.trim())) {
                    Ok(url) => Some(url.to_string()),
                    Err(e) => {
                        warn!("Ignore previous link {:?}: {}", href, e);
                        None
                    }
                }
            });

        let nodes = doc
            .select(&RESULTS_TABLE)
            .next()
            .map(table_nodes)
            .unwrap_or_default();

        Ok(ParsedPage {
            nodes,
            previous_page_url,
        })
    }
}

fn table_nodes(table: ElementRef) -> Vec<PageNode> {
    let mut nodes = vec![];
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => nodes.push(PageNode::Header(first_text(child, &DAY))),
            "tr" => nodes.push(PageNode::Row(row_cells(child))),
            // html5ever wraps bare rows in an implicit tbody
            "tbody" => nodes.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr")
                    .map(|tr| PageNode::Row(row_cells(tr))),
            ),
            _ => {}
        }
    }
    nodes
}

fn row_cells(tr: ElementRef) -> RowCells {
    RowCells {
        home_team_name: first_text(tr, &HOME_TEAM),
        away_team_name: first_text(tr, &AWAY_TEAM),
        score: first_text(tr, &SCORE),
        time: first_text(tr, &KICKOFF),
    }
}

fn first_text(el: ElementRef, selector: &Selector) -> Option<String> {
    el.select(selector).next().and_then(|el| {
        let text = el.text().collect::<String>();
        let text = regex!(r"\s+").replace_all(&text, " ").trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    })
}
