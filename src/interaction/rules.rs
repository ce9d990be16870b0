//! The ordered decision table that maps one inbound event to one [`Action`].
//!
//! Rules are evaluated top to bottom and the first matching predicate wins.
//! Each predicate carries its own guards, so a rule reads (and tests) on its own.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::base::{
    catalog::{Catalog, KeywordCategory, TemplateKind},
    types::{Action, BotIdentity, EventKind, IgnoreReason, InboundEvent, Reaction, Rejection, Reply},
};

/// Reaction added to the thread parent when a user says thanks.
pub const THANKS_REACTION: &str = "checkgreens";

/// Thread reply that marks an issue as resolved.
const THANKS_TRIGGER: &str = "thx";

/// Thread reply asking for a human.
const HELP_TRIGGER: &str = "help";

/// Weekend thread replies containing this get the on-call information.
const URGENT_TRIGGER: &str = "urgent";

/// Whether `date` falls on a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub event: &'a InboundEvent,
    pub bot: &'a BotIdentity,
    pub catalog: &'a Catalog,
    /// Lowercased message text.
    pub text: String,
    /// Highest-priority keyword category in the text, if any.
    pub keyword: Option<KeywordCategory>,
    pub weekend: bool,
}

impl<'a> RuleContext<'a> {
    pub fn new(event: &'a InboundEvent, today: NaiveDate, bot: &'a BotIdentity, catalog: &'a Catalog) -> Self {
        let text = event.text.to_lowercase();
        let keyword = catalog.match_keywords(&text);

        Self {
            event,
            bot,
            catalog,
            text,
            keyword,
            weekend: is_weekend(today),
        }
    }

    fn is_message(&self) -> bool {
        self.event.kind == EventKind::Message
    }

    fn is_own_message(&self) -> bool {
        self.event.user_id.as_deref() == Some(self.bot.bot_user_id.as_str())
    }

    /// A message from someone other than the bot.
    fn is_user_message(&self) -> bool {
        self.is_message() && self.event.user_id.is_some() && !self.is_own_message()
    }

    fn is_thread_reply(&self) -> bool {
        !self.event.is_top_level()
    }

    /// A reply threaded to the event itself.
    fn reply(&self, template: TemplateKind) -> Reply {
        Reply {
            channel_id: self.event.channel_id.clone(),
            thread_ts: self.event.ts.clone(),
            template,
        }
    }
}

/// A named predicate/action pair.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&RuleContext) -> bool,
    pub action: fn(&RuleContext) -> Action,
}

/// The decision table, in precedence order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "url_verification",
        applies: |cx| cx.event.kind == EventKind::UrlVerification && cx.event.challenge.is_some(),
        action: |cx| Action::RespondChallenge(cx.event.challenge.clone().unwrap_or_default()),
    },
    Rule {
        name: "unhandled_event",
        applies: |cx| !cx.is_message(),
        action: |_| Action::Ignore(IgnoreReason::UnhandledEventType),
    },
    Rule {
        name: "missing_user",
        applies: |cx| cx.is_message() && cx.event.user_id.is_none(),
        action: |_| Action::RejectInvalid(Rejection::MissingUserId),
    },
    Rule {
        name: "own_message",
        applies: |cx| cx.is_message() && cx.is_own_message(),
        action: |_| Action::Ignore(IgnoreReason::OwnMessage),
    },
    Rule {
        name: "weekend_top_level",
        applies: |cx| cx.is_user_message() && cx.event.is_top_level() && cx.weekend,
        action: |cx| Action::SendMessage(cx.reply(TemplateKind::WeekendCombined)),
    },
    Rule {
        name: "weekday_keyword",
        applies: |cx| cx.is_user_message() && cx.event.is_top_level() && !cx.weekend && cx.keyword.is_some(),
        action: |cx| {
            cx.keyword
                .map_or(Action::Ignore(IgnoreReason::NoMatchingRule), |category| Action::SendMessage(cx.reply(category.template())))
        },
    },
    Rule {
        name: "weekend_urgent",
        applies: |cx| cx.is_user_message() && cx.is_thread_reply() && cx.weekend && cx.text.contains(URGENT_TRIGGER),
        action: |cx| Action::SendMessage(cx.reply(TemplateKind::UrgentInfo)),
    },
    Rule {
        name: "thanks",
        applies: |cx| cx.is_user_message() && cx.is_thread_reply() && cx.text.trim() == THANKS_TRIGGER,
        action: |cx| Action::ReactAndSend {
            reaction: Reaction {
                channel_id: cx.event.channel_id.clone(),
                timestamp: cx.event.thread_ts.clone().unwrap_or_default(),
                name: THANKS_REACTION.to_string(),
            },
            reply: cx.reply(TemplateKind::ThanksAck),
        },
    },
    Rule {
        name: "help",
        applies: |cx| cx.is_user_message() && cx.is_thread_reply() && cx.text == HELP_TRIGGER,
        action: |cx| Action::SendMessage(cx.reply(TemplateKind::HelpAck)),
    },
];

/// Decide what to do with one inbound event.
///
/// Pure: the current date and the bot identity are passed in, and the
/// returned action is executed elsewhere.
pub fn classify(event: &InboundEvent, today: NaiveDate, bot: &BotIdentity, catalog: &Catalog) -> Action {
    let cx = RuleContext::new(event, today, bot, catalog);

    for rule in RULES {
        if (rule.applies)(&cx) {
            debug!(rule = rule.name, "Rule matched.");
            return (rule.action)(&cx);
        }
    }

    debug!("No rule matched.");
    Action::Ignore(IgnoreReason::NoMatchingRule)
}
