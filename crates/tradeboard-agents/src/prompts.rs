use tradeboard_models::{PipelineState, ResearchRole, RiskRole};

use crate::llm::ChatMessage;

/// The closing line the trader and judges are asked to end with.
pub const PROPOSAL_TEMPLATE: &str = "FINAL TRANSACTION PROPOSAL: **BUY/HOLD/SELL**";

/// Placeholder shown when a transcript has no turns yet.
const NO_PRIOR_TURNS: &str = "(no prior turns)";

fn or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        NO_PRIOR_TURNS
    } else {
        text
    }
}

fn report_block(state: &PipelineState) -> String {
    let mut block = format!(
        "Market research report: {}\n\
         Social media sentiment report: {}\n\
         Latest world affairs news: {}\n\
         Company fundamentals report: {}",
        state.market_report,
        state.sentiment_report,
        state.news_report,
        state.fundamentals_report,
    );
    if let Some(alpha) = &state.alpha_factors_report {
        block.push_str(&format!("\nAlpha factors report: {alpha}"));
    }
    block
}

pub fn researcher_prompt(role: ResearchRole, state: &PipelineState, past_lessons: &str) -> String {
    let debate = &state.investment_debate_state;
    let (stance, opponent) = match role {
        ResearchRole::Bull => (
            "You are a Bull Analyst advocating for investing in {company}. Build a strong, \
             evidence-based case emphasizing growth potential, competitive advantages and \
             positive market indicators.",
            "bear",
        ),
        ResearchRole::Bear => (
            "You are a Bear Analyst making the case against investing in {company}. Present a \
             well-reasoned argument emphasizing risks, challenges and negative indicators.",
            "bull",
        ),
    };
    let stance = stance.replace("{company}", &state.company_of_interest);

    format!(
        "{stance}\n\n\
         Engage directly with the {opponent} analyst's latest points, counter them with \
         specific data, and argue conversationally rather than listing facts.\n\n\
         Resources available:\n\
         {reports}\n\
         Conversation history of the debate: {history}\n\
         Last {opponent} argument: {last}\n\
         Reflections from similar situations and lessons learned: {past_lessons}\n\n\
         Deliver a compelling {side} argument and learn from the lessons above.",
        reports = report_block(state),
        history = or_placeholder(debate.history.as_str()),
        last = or_placeholder(debate.opponent_response(role)),
        side = match role {
            ResearchRole::Bull => "bull",
            ResearchRole::Bear => "bear",
        },
    )
}

pub fn risk_analyst_prompt(role: RiskRole, state: &PipelineState, past_lessons: &str) -> String {
    let debate = &state.risk_debate_state;
    let stance = match role {
        RiskRole::Risky => {
            "As the Risky Risk Analyst, champion high-reward, high-risk opportunities. Argue for \
             bold strategies and point out where the cautious views miss upside."
        }
        RiskRole::Safe => {
            "As the Safe/Conservative Risk Analyst, protect assets and minimize volatility. \
             Scrutinize high-risk elements and argue for the most reliable course."
        }
        RiskRole::Neutral => {
            "As the Neutral Risk Analyst, weigh both upside and downside. Challenge both the \
             risky and the safe analyst where they are too optimistic or too cautious."
        }
    };

    let others = debate
        .other_responses(role)
        .into_iter()
        .map(|(other, text)| format!("Last {} argument: {}", other.label(), or_placeholder(text)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{stance}\n\n\
         Here is the trader's decision for {company}:\n{trader_plan}\n\n\
         Resources available:\n\
         {reports}\n\
         Conversation history of the risk debate: {history}\n\
         {others}\n\
         Reflections from similar situations and lessons learned: {past_lessons}\n\n\
         Respond to the other analysts' specific points and argue conversationally without \
         special formatting.",
        company = state.company_of_interest,
        trader_plan = state.trader_investment_plan,
        reports = report_block(state),
        history = or_placeholder(debate.history.as_str()),
    )
}

pub fn research_manager_prompt(state: &PipelineState, past_lessons: &str) -> String {
    format!(
        "As the portfolio manager and debate facilitator, critically evaluate this round of \
         debate and make a definitive decision: align with the bear analyst, the bull analyst, \
         or choose Hold only if it is strongly justified by the arguments presented.\n\n\
         Summarize the key points from both sides, then deliver a clear recommendation \
         (Buy, Sell, or Hold) backed by the most convincing evidence. Do not default to Hold \
         because both sides have valid points.\n\n\
         Develop a detailed investment plan for the trader including your recommendation, \
         rationale and concrete strategic actions.\n\n\
         Take into account your past mistakes on similar situations:\n\"{past_lessons}\"\n\n\
         Debate History:\n{history}",
        history = or_placeholder(state.investment_debate_state.history.as_str()),
    )
}

pub fn trader_messages(state: &PipelineState, past_lessons: &str) -> Vec<ChatMessage> {
    let alpha_context = match &state.alpha_factors_report {
        Some(alpha) => format!(
            "\n\nAlpha Factors Analysis:\n{alpha}\n\n\
             Pay special attention to the alpha factors analysis; its quantitative signals can \
             strongly support BUY, SELL, or HOLD."
        ),
        None => String::new(),
    };

    let system = format!(
        "You are a trading agent analyzing market data to make investment decisions. Provide a \
         specific recommendation: BUY when there are strong growth opportunities and positive \
         indicators, SELL when risks outweigh potential gains, or HOLD when evidence is \
         balanced. Evaluate BUY, SELL, and HOLD equally and do not default to any of them. \
         End with a firm decision and always conclude your response with \
         '{PROPOSAL_TEMPLATE}' to confirm your recommendation. Use lessons from past decisions \
         to avoid repeating mistakes. Reflections from similar situations you traded in: \
         {past_lessons}"
    );

    let user = format!(
        "Based on a comprehensive analysis by a team of analysts, here is an investment plan \
         tailored for {company}. It incorporates current technical market trends, \
         macroeconomic indicators and social media sentiment. Use this plan as a foundation \
         for evaluating your next trading decision.\n\n\
         Proposed Investment Plan: {plan}{alpha_context}\n\n\
         Consider BUY, SELL, and HOLD equally based on the strength of the evidence.",
        company = state.company_of_interest,
        plan = state.investment_plan,
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn risk_manager_prompt(state: &PipelineState, past_lessons: &str) -> String {
    format!(
        "As the Risk Management Judge and Debate Facilitator, evaluate the debate between the \
         Risky, Neutral, and Safe/Conservative analysts and determine the best course of action \
         for the trader.\n\n\
         Your decision must be a clear recommendation: Buy, Sell, or Hold. Evaluate all three \
         equally. Choose HOLD only when the evidence is genuinely balanced, SELL only when risks \
         clearly dominate, and BUY when positive signals outweigh the concerns.\n\n\
         Guidelines:\n\
         1. Summarize the strongest points from each analyst.\n\
         2. Support your recommendation with quotes and counterarguments from the debate.\n\
         3. Refine the trader's original plan, **{plan}**, based on the analysts' insights.\n\
         4. Use lessons from **{past_lessons}** to avoid repeating a wrong BUY/SELL/HOLD call.\n\n\
         Explain why you chose your recommendation over the alternatives and conclude with \
         '{PROPOSAL_TEMPLATE}'.\n\n\
         ---\n\n\
         **Analysts Debate History:**\n{history}",
        plan = state.investment_plan,
        history = or_placeholder(state.risk_debate_state.history.as_str()),
    )
}

/// Instructions for the constrained label-extraction call.
pub const SIGNAL_EXTRACTION_INSTRUCTIONS: &str = "You are an efficient assistant designed to \
    analyze paragraphs or financial reports provided by a group of analysts. Your task is to \
    extract the investment decision: BUY, SELL, or HOLD. Consider all three options equally. \
    Do not have any bias; extract the decision that best matches the content. If the content \
    recommends buying, extract BUY. If it recommends selling, extract SELL. If it recommends \
    holding or waiting, extract HOLD. Provide only the extracted decision (BUY, SELL, or HOLD) \
    as your output, without adding any additional text or information.";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tradeboard_models::{AnalystReports, Debate, RiskDebateState};

    fn state() -> PipelineState {
        let mut state = PipelineState::new("SPY", NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        state.apply_reports(AnalystReports {
            market_report: "MARKET-R".to_string(),
            sentiment_report: "SENTIMENT-R".to_string(),
            news_report: "NEWS-R".to_string(),
            fundamentals_report: "FUNDAMENTALS-R".to_string(),
            alpha_factors_report: None,
        });
        state
    }

    #[test]
    fn researcher_prompt_embeds_reports_and_lessons() {
        let prompt = researcher_prompt(ResearchRole::Bull, &state(), "LESSON-1");
        assert!(prompt.contains("You are a Bull Analyst"));
        assert!(prompt.contains("investing in SPY"));
        assert!(prompt.contains("MARKET-R"));
        assert!(prompt.contains("FUNDAMENTALS-R"));
        assert!(prompt.contains("LESSON-1"));
        assert!(prompt.contains(NO_PRIOR_TURNS));
        assert!(!prompt.contains("Alpha factors report"));
    }

    #[test]
    fn bear_prompt_quotes_latest_bull_argument() {
        let mut s = state();
        s.investment_debate_state = s
            .investment_debate_state
            .advance_round(ResearchRole::Bull, "Bull Analyst: margins are expanding");
        let prompt = researcher_prompt(ResearchRole::Bear, &s, "none");
        assert!(prompt.contains("You are a Bear Analyst"));
        assert!(prompt.contains("Last bull argument: Bull Analyst: margins are expanding"));
    }

    #[test]
    fn risk_prompt_lists_both_other_analysts() {
        let mut s = state();
        s.trader_investment_plan = "TRADER-PLAN".to_string();
        s.risk_debate_state =
            RiskDebateState::default().advance_round(RiskRole::Risky, "Risky Analyst: go big");
        let prompt = risk_analyst_prompt(RiskRole::Safe, &s, "none");
        assert!(prompt.contains("Safe/Conservative Risk Analyst"));
        assert!(prompt.contains("TRADER-PLAN"));
        assert!(prompt.contains("Last Risky Analyst argument: Risky Analyst: go big"));
        assert!(prompt.contains(&format!("Last Neutral Analyst argument: {NO_PRIOR_TURNS}")));
    }

    #[test]
    fn trader_messages_require_marker() {
        let mut s = state();
        s.investment_plan = "PLAN".to_string();
        let messages = trader_messages(&s, "LESSON");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains(PROPOSAL_TEMPLATE));
        assert!(messages[0].content.contains("LESSON"));
        assert!(messages[1].content.contains("Proposed Investment Plan: PLAN"));
        assert!(!messages[1].content.contains("Alpha Factors Analysis"));
    }

    #[test]
    fn trader_includes_alpha_factors_when_present() {
        let mut s = state();
        s.alpha_factors_report = Some("MOMENTUM-FACTOR".to_string());
        let messages = trader_messages(&s, "LESSON");
        assert!(messages[1].content.contains("Alpha Factors Analysis:\nMOMENTUM-FACTOR"));
    }

    #[test]
    fn risk_manager_prompt_embeds_plan_and_history() {
        let mut s = state();
        s.investment_plan = "RESEARCH-PLAN".to_string();
        s.risk_debate_state =
            RiskDebateState::default().advance_round(RiskRole::Neutral, "Neutral Analyst: meh");
        let prompt = risk_manager_prompt(&s, "LESSON");
        assert!(prompt.contains("**RESEARCH-PLAN**"));
        assert!(prompt.contains("Neutral Analyst: meh"));
        assert!(prompt.contains(PROPOSAL_TEMPLATE));
    }

    #[test]
    fn extraction_instructions_name_all_labels() {
        for label in ["BUY", "SELL", "HOLD"] {
            assert!(SIGNAL_EXTRACTION_INSTRUCTIONS.contains(label));
        }
        assert!(SIGNAL_EXTRACTION_INSTRUCTIONS.contains("Do not have any bias"));
    }
}
