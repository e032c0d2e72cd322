//! Known top-level domains.
//!
//! Sorted lowercase table used to intern common single-label names.
//! Keep it strictly ordered: lookups binary-search it.

pub(crate) static KNOWN_TLDS: &[&str] = &[
    "ac", "academy", "ad", "ae", "aero", "af", "ag", "agency", "ai", "al", "am", "ao", "app", "aq",
    "ar", "arpa", "as", "asia", "at", "au", "aw", "ax", "az", "ba", "bb", "bd", "be", "bf", "bg",
    "bh", "bi", "biz", "bj", "blog", "bm", "bn", "bo", "br", "bs", "bt", "business", "bw", "by",
    "bz", "ca", "cat", "cc", "cd", "center", "cf", "ch", "ci", "ck", "cl", "click", "cloud", "club",
    "cm", "cn", "co", "com", "company", "coop", "cr", "cu", "cv", "cw", "cx", "cy", "cz", "de",
    "design", "dev", "digital", "dj", "dk", "dm", "do", "dz", "ec", "edu", "ee", "eg", "email",
    "er", "es", "et", "eu", "fi", "fj", "fk", "fm", "fo", "fr", "ga", "gd", "ge", "gf", "gg", "gh",
    "gi", "gl", "global", "gm", "gn", "gov", "gp", "gq", "gr", "group", "gs", "gt", "gu", "gw",
    "gy", "hk", "hm", "hn", "host", "hr", "ht", "hu", "id", "ie", "il", "im", "in", "info", "int",
    "international", "io", "iq", "ir", "is", "it", "je", "jm", "jo", "jobs", "jp", "ke", "kg", "kh",
    "ki", "km", "kn", "kp", "kr", "kw", "ky", "kz", "la", "lb", "lc", "li", "life", "link", "live",
    "lk", "lr", "ls", "lt", "lu", "lv", "ly", "ma", "mc", "md", "me", "media", "mg", "mh", "mil",
    "mk", "ml", "mm", "mn", "mo", "mobi", "mp", "mq", "mr", "ms", "mt", "mu", "museum", "mv", "mw",
    "mx", "my", "mz", "na", "name", "nc", "ne", "net", "network", "news", "nf", "ng", "ni", "nl",
    "no", "np", "nr", "nu", "nz", "om", "online", "org", "pa", "page", "pe", "pf", "pg", "ph", "pk",
    "pl", "pm", "pn", "post", "pr", "pro", "ps", "pt", "pw", "py", "qa", "re", "ro", "rs", "ru",
    "rw", "sa", "sb", "sc", "science", "sd", "se", "services", "sg", "sh", "shop", "si", "site",
    "sk", "sl", "sm", "sn", "so", "software", "solutions", "space", "sr", "ss", "st", "store",
    "studio", "sv", "sx", "sy", "systems", "sz", "tc", "td", "tech", "tel", "tf", "tg", "th", "tj",
    "tk", "tl", "tm", "tn", "to", "today", "tr", "travel", "tt", "tv", "tw", "tz", "ua", "ug", "uk",
    "us", "uy", "uz", "va", "vc", "ve", "vg", "vi", "vn", "vu", "website", "wf", "world", "ws",
    "xxx", "xyz", "ye", "yt", "za", "zm", "zw",
];

/// Length of the longest entry in [`KNOWN_TLDS`].
pub(crate) const LONGEST_KNOWN_TLD: usize = longest(KNOWN_TLDS);

const fn longest(table: &[&str]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < table.len() {
        if table[i].len() > max {
            max = table[i].len();
        }
        i += 1;
    }
    max
}

/// Finds the interned entry matching `name`, ignoring ASCII case.
pub(crate) fn find(name: &str) -> Option<&'static str> {
    if name.len() > LONGEST_KNOWN_TLD {
        return None;
    }
    KNOWN_TLDS
        .binary_search_by(|probe| super::name::cmp_ignore_ascii_case(probe, name))
        .ok()
        .map(|i| KNOWN_TLDS[i])
}
