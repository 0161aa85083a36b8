//! Language ids of name records mapped to BCP 47 language tags.

/// Language tag of a Macintosh language id.
pub fn mac_language(language_id: u16) -> Option<&'static str> {
    Some(match language_id {
        0 => "en",
        1 => "fr",
        2 => "de",
        3 => "it",
        4 => "nl",
        5 => "sv",
        6 => "es",
        7 => "da",
        8 => "pt",
        9 => "no",
        10 => "he",
        11 => "ja",
        12 => "ar",
        13 => "fi",
        14 => "el",
        15 => "is",
        16 => "mt",
        17 => "tr",
        18 => "hr",
        19 => "zh-Hant",
        20 => "ur",
        21 => "hi",
        22 => "th",
        23 => "ko",
        24 => "lt",
        25 => "pl",
        26 => "hu",
        27 => "et",
        28 => "lv",
        29 => "smi",
        30 => "fo",
        31 => "fa",
        32 => "ru",
        33 => "zh",
        34 => "nl-BE",
        35 => "ga",
        36 => "sq",
        37 => "ro",
        38 => "cs",
        39 => "sk",
        40 => "sl",
        41 => "yi",
        42 => "sr",
        43 => "mk",
        44 => "bg",
        45 => "uk",
        46 => "be",
        47 => "uz",
        48 => "kk",
        49 => "az-Cyrl",
        50 => "az-Arab",
        51 => "hy",
        52 => "ka",
        53 => "mo",
        54 => "ky",
        55 => "tg",
        56 => "tk",
        57 => "mn-CN",
        58 => "mn",
        59 => "ps",
        60 => "ks",
        61 => "ku",
        62 => "sd",
        63 => "bo",
        64 => "ne",
        65 => "sa",
        66 => "mr",
        67 => "bn",
        68 => "as",
        69 => "gu",
        70 => "pa",
        71 => "or",
        72 => "ml",
        73 => "kn",
        74 => "ta",
        75 => "te",
        76 => "si",
        77 => "my",
        78 => "km",
        79 => "lo",
        80 => "vi",
        81 => "id",
        82 => "tl",
        83 => "ms",
        84 => "ms-Arab",
        85 => "am",
        86 => "ti",
        87 => "om",
        88 => "so",
        89 => "sw",
        90 => "rw",
        91 => "rn",
        92 => "ny",
        93 => "mg",
        94 => "eo",
        128 => "cy",
        129 => "eu",
        130 => "ca",
        131 => "la",
        132 => "qu",
        133 => "gn",
        134 => "ay",
        135 => "tt",
        136 => "ug",
        137 => "dz",
        138 => "jv",
        139 => "su",
        140 => "gl",
        141 => "af",
        142 => "br",
        143 => "iu",
        144 => "gd",
        145 => "gv",
        146 => "ga",
        147 => "to",
        148 => "el-polyton",
        149 => "kl",
        150 => "az",
        _ => return None,
    })
}

/// Language tag of a Windows LCID. Only the more common ids are known.
pub fn windows_language(language_id: u16) -> Option<&'static str> {
    Some(match language_id {
        0x0401 => "ar",
        0x0402 => "bg",
        0x0403 => "ca",
        0x0404 => "zh-TW",
        0x0405 => "cs",
        0x0406 => "da",
        0x0407 => "de",
        0x0408 => "el",
        0x0409 => "en",
        0x040A => "es",
        0x040B => "fi",
        0x040C => "fr",
        0x040D => "he",
        0x040E => "hu",
        0x040F => "is",
        0x0410 => "it",
        0x0411 => "ja",
        0x0412 => "ko",
        0x0413 => "nl",
        0x0414 => "nb",
        0x0415 => "pl",
        0x0416 => "pt",
        0x0418 => "ro",
        0x0419 => "ru",
        0x041A => "hr",
        0x041B => "sk",
        0x041C => "sq",
        0x041D => "sv",
        0x041E => "th",
        0x041F => "tr",
        0x0420 => "ur",
        0x0421 => "id",
        0x0422 => "uk",
        0x0423 => "be",
        0x0424 => "sl",
        0x0425 => "et",
        0x0426 => "lv",
        0x0427 => "lt",
        0x0429 => "fa",
        0x042A => "vi",
        0x042B => "hy",
        0x042D => "eu",
        0x042F => "mk",
        0x0436 => "af",
        0x0437 => "ka",
        0x0438 => "fo",
        0x0439 => "hi",
        0x043E => "ms",
        0x0441 => "sw",
        0x0445 => "bn",
        0x0449 => "ta",
        0x044A => "te",
        0x0452 => "cy",
        0x0456 => "gl",
        0x0804 => "zh",
        0x0807 => "de-CH",
        0x0809 => "en-GB",
        0x080A => "es-MX",
        0x080C => "fr-BE",
        0x0810 => "it-CH",
        0x0813 => "nl-BE",
        0x0814 => "nn",
        0x0816 => "pt-PT",
        0x081A => "sr-Latn",
        0x0C04 => "zh-HK",
        0x0C07 => "de-AT",
        0x0C09 => "en-AU",
        0x0C0A => "es",
        0x0C0C => "fr-CA",
        0x0C1A => "sr",
        0x1004 => "zh-SG",
        0x1009 => "en-CA",
        0x100C => "fr-CH",
        0x1404 => "zh-MO",
        0x1409 => "en-NZ",
        0x1809 => "en-IE",
        _ => return None,
    })
}
