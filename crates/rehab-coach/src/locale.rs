//! Spoken-feedback locales and the Hindi phrase table.

use std::fmt;
use std::str::FromStr;

use rehab_core::Error;
use rehab_motion::Phrase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "hi-IN")]
    HiIn,
}

impl Locale {
    /// BCP 47 tag handed to the speech engine
    pub fn code(self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::HiIn => "hi-IN",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Locale::EnUs => Locale::HiIn,
            Locale::HiIn => Locale::EnUs,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en-US" => Ok(Locale::EnUs),
            "hi-IN" => Ok(Locale::HiIn),
            other => Err(Error::Config(format!("unsupported locale: {}", other))),
        }
    }
}

/// Hindi rendering of a feedback phrase, if one exists
pub fn hindi(phrase: Phrase) -> Option<&'static str> {
    use Phrase::*;

    let text = match phrase {
        RepCounted => "✓ गिना गया!",

        StandReady => "तैयार खड़े रहें",
        GoodDepth => "✓ अच्छी गहराई! खड़े हो जाएं",
        SquatDown => "स्क्वाट करें",
        StandUpFully => "पूरा खड़े हो जाएं",

        LungeDown => "लंज करें",
        StandUp => "खड़े हो जाएं",

        ArmAtSide => "हाथ बगल में",
        GoodCurl => "✓ अच्छा कर्ल! नीचे करें",
        CurlArmUp => "हाथ ऊपर कर्ल करें",
        ExtendArmFully => "हाथ पूरा फैलाएं",

        StartPosition => "शुरुआती स्थिति",
        FullExtension => "✓ पूरा फैलाव! नीचे करें",
        PressArmsOverhead => "हाथ सिर के ऊपर दबाएं",
        LowerToShoulders => "कंधों तक नीचे करें",

        ArmsAtSides => "हाथ बगल में",
        GoodRaiseLowerSlowly => "✓ अच्छा उठाव! धीरे नीचे करें",
        RaiseArmsToSides => "हाथ बगल में उठाएं",
        LowerArmsDown => "हाथ नीचे करें",

        StandStraight => "सीधे खड़े रहें",
        GoodHeight => "✓ अच्छी ऊंचाई! पैर नीचे करें",
        RaiseYourKnee => "घुटना उठाएं",
        LowerLegCompletely => "पैर पूरा नीचे करें",

        RiseOnToes => "पंजों पर उठें",
        GoodRaiseLowerHeels => "✓ अच्छा उठाव! एड़ी नीचे करें",
        LowerHeels => "एड़ी नीचे करें",

        MakeSlowCircles => "धीरे-धीरे गोल घुमाएं",

        TooDeepComeUp => "बहुत नीचे। थोड़ा ऊपर आएं।",
        BendKneesMore => "घुटने और मोड़ें। नीचे जाएं।",
        PerfectSquatDepth => "बिल्कुल सही गहराई। पकड़ें।",
        KeepBackStraight => "पीठ सीधी रखें।",

        NotTooDeep => "बहुत नीचे नहीं। ऊपर आएं।",
        LowerBackKnee => "पिछला घुटना और नीचे करें।",
        GreatLungeForm => "बढ़िया लंज। स्थिर रहें।",
        KeepTorsoUpright => "धड़ सीधा रखें।",

        CurlUpMore => "और ऊपर कर्ल करें। कंधे तक लाएं।",
        LowerArmExtend => "हाथ नीचे करें। पूरा फैलाएं।",
        PerfectCurl => "बिल्कुल सही। ऊपर दबाएं।",
        KeepElbowStable => "कोहनी स्थिर रखें। झूलें नहीं।",
        SlowAndControlled => "धीरे और नियंत्रित गति।",

        PressHigher => "हाथ और ऊपर दबाएं। पूरा फैलाएं।",
        PerfectPress => "बिल्कुल सही। हाथ पूरे फैले।",
        BreatheOut => "ऊपर दबाते समय सांस छोड़ें।",

        RaiseArmsHigher => "हाथ और ऊपर उठाएं। कंधे तक।",
        LowerSlightly => "थोड़ा नीचे करें। कंधे से ऊपर नहीं।",
        PerfectHeight => "सही ऊंचाई। हाथ जमीन के समानांतर।",
        SlowDown => "धीरे करें। गति नियंत्रित करें।",

        LiftKneeHigher => "घुटना और ऊपर उठाएं। कूल्हे तक।",
        LowerKneeSlightly => "घुटना थोड़ा नीचे करें।",
        PerfectKneeHeight => "सही ऊंचाई। संतुलन बनाएं।",
        FocusOnBalance => "संतुलन पर ध्यान दें। पेट कसें।",
        StandTall => "सीधे खड़े रहें। पीछे झुकें नहीं।",

        BiggerCircles => "बड़े गोले बनाएं। पूरी रेंज।",
        GoodRangeOfMotion => "अच्छी गति रेंज।",
        PerfectCircles => "बिल्कुल सही गोले। हाथ सीधे रखें।",

        AdjustPosture => "थोड़ा समायोजित करें। मुद्रा सीधी रखें।",
        AdjustDepth => "गहराई समायोजित करें।",
        AdjustKneeAngle => "घुटने का कोण समायोजित करें।",
        AdjustArmAngle => "हाथ का कोण समायोजित करें।",

        FirstRepComplete => "पहला पूरा हुआ। जारी रखें।",

        _ => return None,
    };
    Some(text)
}

/// Rep milestone sentence in English
pub fn rep_milestone(count: u32) -> String {
    format!("{} reps done. Great work.", count)
}

/// Extracts `N` from text containing `"N rep done"`, `"N reps completed"`
/// and the like.
pub fn rep_count(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if !bytes[start].is_ascii_digit() || (start > 0 && bytes[start - 1].is_ascii_digit()) {
            start += 1;
            continue;
        }
        let end = start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
        let rest = &text[end..];
        let matched = rest
            .strip_prefix(" rep")
            .map(|r| r.strip_prefix('s').unwrap_or(r))
            .is_some_and(|r| r.starts_with(" done") || r.starts_with(" completed"));
        if matched {
            if let Ok(count) = text[start..end].parse() {
                return Some(count);
            }
        }
        start = end;
    }
    None
}

/// Text to speak in `locale`; untranslated text passes through unchanged
pub fn translate(text: &str, locale: Locale) -> String {
    if locale == Locale::EnUs {
        return text.to_string();
    }
    if let Some(count) = rep_count(text) {
        return format!("{} बार पूरे हुए। बहुत बढ़िया।", count);
    }
    Phrase::from_text(text)
        .and_then(hindi)
        .map_or_else(|| text.to_string(), str::to_string)
}
