use axum::response::Html;

/// GET /
/// Single-page form: upload a resume, paste the job description, name the company.
pub async fn form_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// Model output is inserted with textContent only; it is never parsed as HTML.
const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Resume Tailoring Pipeline</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
  label { display: block; margin-top: 1rem; font-weight: 600; }
  textarea, input[type=text] { width: 100%; box-sizing: border-box; }
  textarea { min-height: 10rem; }
  pre { white-space: pre-wrap; background: #f6f6f6; padding: 1rem; border-radius: 4px; }
  #status { margin-top: 1rem; }
  progress { width: 100%; }
  .error { color: #b00020; }
  .warning { color: #8a6d00; }
</style>
</head>
<body>
<h1>Resume Tailoring Pipeline</h1>
<form id="pipeline-form">
  <label for="resume">Resume (PDF, TXT or MD)</label>
  <input id="resume" name="resume" type="file" accept=".pdf,.txt,.md,.markdown">
  <label for="job_description">Job description</label>
  <textarea id="job_description" name="job_description"></textarea>
  <label for="company_name">Company name</label>
  <input id="company_name" name="company_name" type="text">
  <p><button type="submit">Run pipeline</button></p>
</form>
<progress id="progress" max="100" value="0" hidden></progress>
<div id="status"></div>
<div id="results">
  <section id="research_section" hidden>
    <h2>Company research</h2>
    <pre id="research_summary"></pre>
  </section>
  <section id="gap_section" hidden>
    <h2>Gap analysis</h2>
    <p id="match_score"></p>
    <pre id="gap_report"></pre>
  </section>
  <section id="tailored_section" hidden>
    <h2>Tailored content</h2>
    <pre id="tailored_content"></pre>
    <ul id="warnings"></ul>
  </section>
</div>
<script>
const form = document.getElementById("pipeline-form");
const status = document.getElementById("status");
const progress = document.getElementById("progress");
const sections = ["research_section", "gap_section", "tailored_section"]
  .map((id) => document.getElementById(id));

const STATE_LABELS = {
  idle: "Waiting",
  extracting: "Extracting resume text",
  researching: "Researching the company",
  analyzing: "Analyzing gaps",
  writing: "Writing tailored content",
  done: "Done",
  error: "Failed",
};

function setStatus(text, cls) {
  status.textContent = text;
  status.className = cls || "";
}

function show(id, text) {
  document.getElementById(id).textContent = text;
  document.getElementById(id).closest("section").hidden = false;
}

function showReport(report) {
  show("research_summary", report.research_summary);
  show("gap_report", report.gap_report);
  const score = report.gap_overview.match_score;
  document.getElementById("match_score").textContent =
    score === null ? "" : "Match score: " + score + "/100";
  show("tailored_content", report.tailored_content);
  const warnings = document.getElementById("warnings");
  warnings.replaceChildren();
  for (const w of report.warnings) {
    const li = document.createElement("li");
    li.className = "warning";
    li.textContent = w;
    warnings.appendChild(li);
  }
}

function handleEvent(event) {
  switch (event.type) {
    case "progress":
      progress.value = event.percent;
      setStatus(STATE_LABELS[event.state] || event.state);
      break;
    case "research":
      show("research_summary", event.summary);
      break;
    case "gap_report":
      show("gap_report", event.markdown);
      break;
    case "completed":
      showReport(event.report);
      setStatus("Done.");
      break;
    case "failed":
      setStatus(event.message, "error");
      break;
  }
}

// Each server-sent event is separated by a blank line; only `data:` lines carry JSON.
function drainEvents(buffer) {
  const chunks = buffer.split("\n\n");
  const rest = chunks.pop();
  for (const chunk of chunks) {
    const data = chunk
      .split("\n")
      .filter((line) => line.startsWith("data:"))
      .map((line) => line.slice(5).trimStart())
      .join("\n");
    if (data) handleEvent(JSON.parse(data));
  }
  return rest;
}

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  for (const section of sections) section.hidden = true;
  progress.value = 0;
  progress.hidden = false;
  setStatus("Submitting...");
  const button = form.querySelector("button");
  button.disabled = true;
  try {
    const response = await fetch("/api/v1/pipeline/stream", {
      method: "POST",
      body: new FormData(form),
    });
    if (!response.ok) {
      const body = await response.json().catch(() => ({}));
      setStatus(body.error ? body.error.message : "Request failed", "error");
      progress.hidden = true;
      return;
    }
    const reader = response.body.pipeThrough(new TextDecoderStream()).getReader();
    let buffer = "";
    for (;;) {
      const { value, done } = await reader.read();
      if (done) break;
      buffer = drainEvents((buffer + value).replace(/\r\n/g, "\n"));
    }
    drainEvents(buffer + "\n\n");
  } catch (err) {
    setStatus("Request failed: " + err, "error");
  } finally {
    button.disabled = false;
  }
});
</script>
</body>
</html>
"#;
