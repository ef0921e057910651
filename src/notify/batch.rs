// src/notify/batch.rs

use crate::domain::Listing;
use std::collections::HashSet;

/// Separator between the header and the listing blocks of a message body.
pub const BODY_SEPARATOR: &str = "\r\n\r\n";

const BLOCK_RULE: &str = "*************************";

/// How each listing is rendered into a message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatOptions {
    /// Keep only the first N description lines.
    pub head: Option<usize>,
    pub exclude_links: bool,
}

/// Fixed text that rides along with every message of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLayout {
    pub header: String,
    /// Length of the subject line; SMS gateways fold it into the body.
    pub subject_len: usize,
}

impl BatchLayout {
    /// Characters every message spends before its first listing.
    pub fn overhead(&self) -> usize {
        self.header.chars().count() + BODY_SEPARATOR.len() + self.subject_len
    }
}

/// One outgoing message worth of listings.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBatch {
    pub header: String,
    pub blocks: Vec<String>,
    /// Links of the listings in `blocks`, same order.
    pub links: Vec<String>,
}

impl MessageBatch {
    pub fn body(&self) -> String {
        format!("{}{BODY_SEPARATOR}{}", self.header, self.blocks.concat())
    }

    fn report_len(&self) -> usize {
        self.blocks.iter().map(|b| b.chars().count()).sum()
    }
}

/// Listings whose link is not in `seen`, in their original order.
pub fn filter_new<'a>(listings: &'a [Listing], seen: &[String]) -> Vec<&'a Listing> {
    let seen: HashSet<&str> = seen.iter().map(String::as_str).collect();
    listings
        .iter()
        .filter(|l| !seen.contains(l.link.as_str()))
        .collect()
}

/// Renders one listing as a fixed-layout ASCII block.
pub fn format_listing(listing: &Listing, options: &FormatOptions) -> String {
    let description = match options.head {
        Some(n) => listing
            .description
            .trim()
            .split('\n')
            .take(n)
            .collect::<Vec<_>>()
            .join("\n"),
        None => listing.description.clone(),
    };

    let mut block = String::new();
    block.push_str(BLOCK_RULE);
    block.push('\n');
    if !options.exclude_links {
        block.push_str(&listing.link);
        block.push('\n');
    }
    block.push_str(&listing.title);
    block.push('\n');
    block.push_str(&format!(
        "${} - {} - {}, {}\n",
        listing.price_display(),
        listing.age,
        listing.city,
        listing.state
    ));
    block.push_str(&format!("*  {description}\n\n"));

    // SMS gateways reject anything outside ASCII
    block.retain(|c| c.is_ascii());
    block
}

/// Packs listings into messages that stay under `char_limit` where possible.
///
/// Without a limit (None or 0) everything goes into one message. With a limit a
/// message is sealed before a listing would push header, subject and body
/// over it. A listing that is too large on its own still gets a message of its
/// own.
pub fn batch(
    listings: &[&Listing],
    options: &FormatOptions,
    layout: &BatchLayout,
    char_limit: Option<usize>,
) -> Vec<MessageBatch> {
    let blocks = listings
        .iter()
        .map(|listing| (listing.link.clone(), format_listing(listing, options)));
    pack_blocks(blocks, layout, char_limit)
}

/// Packs already formatted `(link, block)` pairs, keeping their order.
pub fn pack_blocks<I>(blocks: I, layout: &BatchLayout, char_limit: Option<usize>) -> Vec<MessageBatch>
where
    I: IntoIterator<Item = (String, String)>,
{
    let char_limit = char_limit.filter(|&limit| limit > 0);
    let overhead = layout.overhead();
    let empty = || MessageBatch {
        header: layout.header.clone(),
        blocks: Vec::new(),
        links: Vec::new(),
    };

    let mut batches = Vec::new();
    let mut current = empty();

    for (link, block) in blocks {
        if let Some(limit) = char_limit {
            let projected = overhead + current.report_len() + block.chars().count();
            if projected > limit && !current.blocks.is_empty() {
                batches.push(std::mem::replace(&mut current, empty()));
            }
        }

        current.blocks.push(block);
        current.links.push(link);
    }

    if !current.blocks.is_empty() {
        batches.push(current);
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(link: &str) -> Listing {
        Listing {
            title: format!("Item {link}"),
            city: "Provo".into(),
            state: "UT".into(),
            age: "2024-05-01 10:00:00".into(),
            price: 20.0,
            link: link.into(),
            description: "Line one\nLine two\nLine three".into(),
        }
    }

    fn layout(header: &str, subject_len: usize) -> BatchLayout {
        BatchLayout {
            header: header.into(),
            subject_len,
        }
    }

    #[test]
    fn filter_new_drops_seen_and_keeps_order() {
        let listings = vec![listing("/3"), listing("/1"), listing("/2")];
        let seen = vec!["/1".to_string()];

        let new: Vec<_> = filter_new(&listings, &seen)
            .into_iter()
            .map(|l| l.link.as_str())
            .collect();

        assert_eq!(new, vec!["/3", "/2"]);
    }

    #[test]
    fn filter_new_is_idempotent_once_marked() {
        let listings = vec![listing("/1"), listing("/2")];
        let mut seen = Vec::new();

        let first = filter_new(&listings, &seen);
        assert_eq!(first.len(), 2);
        seen.extend(first.iter().map(|l| l.link.clone()));

        assert!(filter_new(&listings, &seen).is_empty());
    }

    #[test]
    fn format_has_fixed_layout() {
        let block = format_listing(&listing("/7"), &FormatOptions::default());

        assert_eq!(
            block,
            "*************************\n/7\nItem /7\n$20 - 2024-05-01 10:00:00 - Provo, UT\n\
             *  Line one\nLine two\nLine three\n\n"
        );
    }

    #[test]
    fn format_can_exclude_links() {
        let options = FormatOptions {
            exclude_links: true,
            ..Default::default()
        };
        let block = format_listing(&listing("/7"), &options);

        assert!(!block.contains("\n/7\n"));
        assert!(block.starts_with("*************************\nItem /7\n"));
    }

    #[test]
    fn format_truncates_description() {
        let options = FormatOptions {
            head: Some(2),
            ..Default::default()
        };
        let mut l = listing("/7");
        l.description = "\n  Line one\nLine two\nLine three\n".into();

        let block = format_listing(&l, &options);

        assert!(block.ends_with("*  Line one\nLine two\n\n"));
    }

    #[test]
    fn format_drops_non_ascii() {
        let mut l = listing("/7");
        l.title = "Caf\u{e9} table \u{1F6B2}".into();

        let block = format_listing(&l, &FormatOptions::default());

        assert!(block.contains("Caf table \n"));
        assert!(block.is_ascii());
    }

    #[test]
    fn no_limit_gives_single_message() {
        let listings = vec![listing("/1"), listing("/2"), listing("/3")];
        let refs: Vec<&Listing> = listings.iter().collect();

        let batches = batch(&refs, &FormatOptions::default(), &layout("H", 10), None);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].links, vec!["/1", "/2", "/3"]);

        let zero = batch(&refs, &FormatOptions::default(), &layout("H", 10), Some(0));
        assert_eq!(zero.len(), 1);
    }

    #[test]
    fn nothing_new_gives_no_messages() {
        assert!(batch(&[], &FormatOptions::default(), &layout("H", 10), None).is_empty());
        assert!(batch(&[], &FormatOptions::default(), &layout("H", 10), Some(50)).is_empty());
    }

    #[test]
    fn limit_splits_and_covers_every_link_once() {
        let listings: Vec<_> = (0..7).map(|i| listing(&format!("/{i}"))).collect();
        let refs: Vec<&Listing> = listings.iter().collect();
        let options = FormatOptions::default();
        let layout = layout("New matches found for query bike", 40);

        let one_block = format_listing(&listings[0], &options).len();
        let limit = layout.overhead() + one_block * 2 + 5;

        let batches = batch(&refs, &options, &layout, Some(limit));

        assert_eq!(batches.len(), 4);
        for b in &batches {
            assert!(b.body().len() + layout.subject_len <= limit);
        }

        let all_links: Vec<_> = batches.iter().flat_map(|b| b.links.clone()).collect();
        let expected: Vec<_> = listings.iter().map(|l| l.link.clone()).collect();
        assert_eq!(all_links, expected);

        let stripped: String = batches
            .iter()
            .map(|b| {
                b.body()
                    .strip_prefix(&format!("{}{BODY_SEPARATOR}", b.header))
                    .unwrap()
                    .to_string()
            })
            .collect();
        let all_blocks: String = refs.iter().map(|l| format_listing(l, &options)).collect();
        assert_eq!(stripped, all_blocks);
    }

    #[test]
    fn oversized_block_travels_alone() {
        let mut big = listing("/big");
        big.description = "x".repeat(500);
        let listings = vec![listing("/1"), big, listing("/2")];
        let refs: Vec<&Listing> = listings.iter().collect();
        let options = FormatOptions::default();
        let layout = layout("H", 0);
        let limit = layout.overhead() + format_listing(&listings[0], &options).len() + 1;

        let batches = batch(&refs, &options, &layout, Some(limit));

        let links: Vec<_> = batches.iter().map(|b| b.links.clone()).collect();
        assert_eq!(links, vec![vec!["/1"], vec!["/big"], vec!["/2"]]);
    }

    fn block(link: &str) -> (String, String) {
        let text = format!("{link:-<29}\n");
        assert_eq!(text.len(), 30);
        (link.to_string(), text)
    }

    #[test]
    fn thirty_char_blocks_under_fifty_go_one_per_message() {
        let layout = layout("", 0);
        let blocks = vec![block("/a"), block("/b"), block("/c")];

        let batches = pack_blocks(blocks, &layout, Some(50));

        let links: Vec<_> = batches.iter().map(|b| b.links.clone()).collect();
        assert_eq!(links, vec![vec!["/a"], vec!["/b"], vec!["/c"]]);
        for b in &batches {
            assert!(b.body().len() <= 50);
        }
    }

    #[test]
    fn blocks_share_a_message_while_they_fit() {
        let layout = layout("", 0);
        let blocks = vec![block("/a"), block("/b"), block("/c")];

        let batches = pack_blocks(blocks, &layout, Some(70));

        let links: Vec<_> = batches.iter().map(|b| b.links.clone()).collect();
        assert_eq!(links, vec![vec!["/a", "/b"], vec!["/c"]]);
    }

    #[test]
    fn body_is_header_then_blocks() {
        let b = MessageBatch {
            header: "New match found for query bike".into(),
            blocks: vec!["A\n".into(), "B\n".into()],
            links: vec!["/a".into(), "/b".into()],
        };

        assert_eq!(b.body(), "New match found for query bike\r\n\r\nA\nB\n");
    }
}
