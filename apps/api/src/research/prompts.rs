// Research Agent prompt templates.

/// ReAct template. Replace: {tools}, {tool_names}, {input}, {agent_scratchpad}
pub const REACT_PROMPT_TEMPLATE: &str = r#"Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought:{agent_scratchpad}"#;

/// Research question for one company. Replace: {company_name}
pub const RESEARCH_QUESTION_TEMPLATE: &str = r#"Research the company '{company_name}'.
Find out:
1. What do they do? (Core Product)
2. What are their recent major news or tech updates?
3. What is their mission or culture?

Summarize this in 3 concise bullet points."#;

pub const SEARCH_TOOL_NAME: &str = "Search";

pub const SEARCH_TOOL_DESCRIPTION: &str =
    "Useful for when you need to answer questions about current events or company details.";

/// Stop sequence that keeps the model from hallucinating its own observations.
pub const OBSERVATION_STOP: &str = "\nObservation";
